use serde::{Deserialize, Serialize};

/// Subscription attached to a client account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
}

impl Subscription {
    /// Creates a subscription from the plan name and its billing status.
    #[must_use]
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }

    /// Returns the plan name as shown to the user.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the opaque billing status reported by the backend.
    #[must_use]
    pub fn status(&self) -> &str {
        self.status.as_str()
    }

    /// Returns the tier the plan name maps to, if it is a known plan.
    #[must_use]
    pub fn tier(&self) -> Option<SubscriptionTier> {
        SubscriptionTier::from_plan_name(self.name.as_str())
    }
}

/// Capability tier reported alongside resolved capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    /// Entry plan, also the fallback for anything unrecognized.
    #[default]
    Basic,
    /// Paid plan with a bounded property quota.
    Premium,
    /// Top plan with no property quota.
    Esmeralda,
    /// Privileged staff accounts.
    Admin,
}

impl SubscriptionTier {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Premium => "premium",
            Self::Esmeralda => "esmeralda",
            Self::Admin => "admin",
        }
    }

    /// Maps a plan name onto a tier.
    ///
    /// Matching is case-insensitive and accepts the tier keyword anywhere in
    /// the name ("Plan Premium" is premium). Keywords are tried in the order
    /// básica, premium, esmeralda. Plan names never map to `Admin`.
    #[must_use]
    pub fn from_plan_name(name: &str) -> Option<Self> {
        let lowered = name.to_lowercase();
        if lowered.contains("básica") {
            Some(Self::Basic)
        } else if lowered.contains("premium") {
            Some(Self::Premium)
        } else if lowered.contains("esmeralda") {
            Some(Self::Esmeralda)
        } else {
            None
        }
    }
}
