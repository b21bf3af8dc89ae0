use serde::{Deserialize, Serialize};

/// Property quota granted by the premium plan.
pub const PREMIUM_PROPERTY_LIMIT: u32 = 5;

/// Maximum number of properties a user may own.
///
/// Serialized as a number, or `null` when unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum PropertyLimit {
    /// At most this many properties.
    Limited(u32),
    /// No quota. Never exceeded.
    Unbounded,
}

impl PropertyLimit {
    /// Returns whether the limit has no upper bound.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Returns whether owning `count` properties goes over the limit.
    #[must_use]
    pub fn is_exceeded_by(&self, count: u32) -> bool {
        match self {
            Self::Limited(limit) => count > *limit,
            Self::Unbounded => false,
        }
    }

    /// Returns whether one more property fits next to `count` existing ones.
    #[must_use]
    pub fn allows_another(&self, count: u32) -> bool {
        match self {
            Self::Limited(limit) => count < *limit,
            Self::Unbounded => true,
        }
    }

    /// Returns how many properties may still be added, `None` when unbounded.
    #[must_use]
    pub fn remaining(&self, count: u32) -> Option<u32> {
        match self {
            Self::Limited(limit) => Some(limit.saturating_sub(count)),
            Self::Unbounded => None,
        }
    }
}

impl Default for PropertyLimit {
    fn default() -> Self {
        Self::Limited(0)
    }
}

impl From<Option<u32>> for PropertyLimit {
    fn from(value: Option<u32>) -> Self {
        value.map(Self::Limited).unwrap_or(Self::Unbounded)
    }
}

impl From<PropertyLimit> for Option<u32> {
    fn from(value: PropertyLimit) -> Self {
        match value {
            PropertyLimit::Limited(limit) => Some(limit),
            PropertyLimit::Unbounded => None,
        }
    }
}
