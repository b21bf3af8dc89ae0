use std::fmt::{Display, Formatter};
use std::str::FromStr;

use habita_core::AppError;
use habita_domain::{Capabilities, Capability, Permission, PermissionPredicate};

/// Access rule a screen or action requires from the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRequirement {
    /// Any signed-in user.
    Authenticated,
    /// Superusers, staff and admin roles only.
    Privileged,
    /// A named permission.
    Permission(String),
    /// A derived capability.
    Capability(Capability),
    /// Room for one more property next to `current_count` owned ones.
    PropertySlot {
        /// Properties the user already owns.
        current_count: u32,
    },
}

impl AccessRequirement {
    /// Shorthand for a well-known permission.
    #[must_use]
    pub fn permission(permission: Permission) -> Self {
        Self::Permission(permission.as_str().to_owned())
    }

    /// Returns whether the capabilities satisfy this requirement.
    #[must_use]
    pub fn is_satisfied_by(&self, capabilities: &Capabilities) -> bool {
        match self {
            Self::Authenticated => true,
            Self::Privileged => capabilities.is_privileged(),
            Self::Permission(name) => capabilities.has_permission(name),
            Self::Capability(capability) => capabilities.allows(*capability),
            Self::PropertySlot { current_count } => capabilities.can_add_property(*current_count),
        }
    }
}

impl Display for AccessRequirement {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authenticated => formatter.write_str("authenticated"),
            Self::Privileged => formatter.write_str("privileged"),
            Self::Permission(name) => write!(formatter, "permission:{name}"),
            Self::Capability(capability) => write!(formatter, "capability:{}", capability.as_str()),
            Self::PropertySlot { current_count } => {
                write!(formatter, "property_slot:{current_count}")
            }
        }
    }
}

impl FromStr for AccessRequirement {
    type Err = AppError;

    /// Parses the format produced by `Display`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once(':') {
            None if value == "authenticated" => Ok(Self::Authenticated),
            None if value == "privileged" => Ok(Self::Privileged),
            Some(("permission", name)) if !name.trim().is_empty() => {
                Ok(Self::Permission(name.to_owned()))
            }
            Some(("capability", name)) => Ok(Self::Capability(name.parse()?)),
            Some(("property_slot", count)) => count
                .parse::<u32>()
                .map(|current_count| Self::PropertySlot { current_count })
                .map_err(|error| {
                    AppError::Validation(format!("invalid property count '{count}': {error}"))
                }),
            _ => Err(AppError::Validation(format!(
                "unknown access requirement '{value}'"
            ))),
        }
    }
}
