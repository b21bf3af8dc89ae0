use std::collections::BTreeSet;
use std::str::FromStr;

use habita_core::AppError;
use serde::{Deserialize, Serialize};

/// Permission names consulted by the capability resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Allows creating, updating and deleting properties.
    #[serde(rename = "cud_propiedad")]
    PropertyWrite,
    /// Allows listing and reading properties.
    #[serde(rename = "ver_propiedades")]
    PropertyRead,
    /// Allows creating, updating and deleting reservations.
    #[serde(rename = "cud_reserva")]
    ReservationWrite,
}

impl Permission {
    /// Returns the permission name as granted by the backend.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PropertyWrite => "cud_propiedad",
            Self::PropertyRead => "ver_propiedades",
            Self::ReservationWrite => "cud_reserva",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::PropertyWrite,
            Permission::PropertyRead,
            Permission::ReservationWrite,
        ];

        ALL
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "cud_propiedad" => Ok(Self::PropertyWrite),
            "ver_propiedades" => Ok(Self::PropertyRead),
            "cud_reserva" => Ok(Self::ReservationWrite),
            _ => Err(AppError::Validation(format!(
                "unknown permission value '{value}'"
            ))),
        }
    }
}

/// Flat set of permission names granted through the user's role.
///
/// The set is open: names the resolver does not know about are kept so
/// `has_permission` can answer for any screen-level check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    /// Creates an empty permission set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a permission name. Blank names are ignored.
    pub fn insert(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.trim().is_empty() {
            self.0.insert(name);
        }
    }

    /// Returns whether the exact permission name is granted.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Returns the number of granted names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no permission is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates granted names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl From<&[Permission]> for PermissionSet {
    fn from(value: &[Permission]) -> Self {
        value.iter().map(Permission::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Permission, PermissionSet};

    #[test]
    fn permission_roundtrip_storage_value() {
        for permission in Permission::all() {
            let restored = Permission::from_str(permission.as_str());
            assert_eq!(restored.ok(), Some(*permission));
        }
    }

    #[test]
    fn unknown_permission_is_rejected() {
        assert!(Permission::from_str("cud_backup").is_err());
    }

    #[test]
    fn permission_set_keeps_unknown_names_and_skips_blanks() {
        let set: PermissionSet = ["ver_reportes", "", "  ", "cud_reserva"]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("ver_reportes"));
        assert!(set.contains(Permission::ReservationWrite.as_str()));
    }

    #[test]
    fn permission_set_matching_is_exact() {
        let set = PermissionSet::from(&[Permission::PropertyRead][..]);
        assert!(set.contains("ver_propiedades"));
        assert!(!set.contains("VER_PROPIEDADES"));
        assert!(!set.contains("ver_propiedade"));
    }
}
