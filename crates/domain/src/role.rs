use std::fmt::{Display, Formatter};

/// Role tag normalized from the free-form backend value.
///
/// Privileged roles are recognized case-insensitively, including the
/// Spanish `Administrador` variant. `Client` only matches the exact
/// upper-case tag `CLIENT`; any other casing falls through to `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    /// `ADMIN`, `ADMINISTRATOR` or `ADMINISTRADOR` in any casing.
    Admin,
    /// `SUPERUSER` in any casing.
    Superuser,
    /// Exactly `CLIENT`. Subscription tiers only apply to this role.
    Client,
    /// Any other tag, kept verbatim.
    Other(String),
}

impl Role {
    /// Normalizes a raw backend role value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_uppercase().as_str() {
            "ADMIN" | "ADMINISTRATOR" | "ADMINISTRADOR" => Self::Admin,
            "SUPERUSER" => Self::Superuser,
            _ if raw == "CLIENT" => Self::Client,
            _ => Self::Other(raw.to_owned()),
        }
    }

    /// Returns whether the role grants every capability unconditionally.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Admin | Self::Superuser)
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => formatter.write_str("ADMIN"),
            Self::Superuser => formatter.write_str("SUPERUSER"),
            Self::Client => formatter.write_str("CLIENT"),
            Self::Other(value) => formatter.write_str(value),
        }
    }
}
