//! Capability resolution: role, permissions and subscription tier mapped to
//! the set of actions the client may offer a user.

use std::str::FromStr;
use std::sync::Arc;

use habita_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{
    PREMIUM_PROPERTY_LIMIT, Permission, PermissionSet, PropertyLimit, Role, SubscriptionTier, User,
};

/// Canonical permission check.
///
/// Consumers gate actions through this trait instead of inspecting roles.
pub trait PermissionPredicate {
    /// Returns whether the named permission is granted.
    fn has_permission(&self, name: &str) -> bool;

    /// Returns whether a well-known permission is granted.
    fn has(&self, permission: Permission) -> bool {
        self.has_permission(permission.as_str())
    }
}

/// Permission check captured when capabilities are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionCheck {
    /// Privileged users pass every check.
    Unrestricted,
    /// Only names in the captured set pass.
    Granted(Arc<PermissionSet>),
}

impl PermissionPredicate for PermissionCheck {
    fn has_permission(&self, name: &str) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Granted(permissions) => permissions.contains(name),
        }
    }
}

/// Gated actions exposed by [`Capabilities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Publishing new properties.
    CreateProperties,
    /// Editing and deleting existing properties.
    ManageProperties,
    /// Browsing property listings.
    ViewProperties,
    /// Booking reservations.
    MakeReservations,
}

impl Capability {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateProperties => "create_properties",
            Self::ManageProperties => "manage_properties",
            Self::ViewProperties => "view_properties",
            Self::MakeReservations => "make_reservations",
        }
    }

    /// Returns all gated actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Capability] = &[
            Capability::CreateProperties,
            Capability::ManageProperties,
            Capability::ViewProperties,
            Capability::MakeReservations,
        ];

        ALL
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|capability| capability.as_str() == value)
            .copied()
            .ok_or_else(|| AppError::Validation(format!("unknown capability value '{value}'")))
    }
}

/// Actions available to one user, derived from a [`User`] snapshot.
///
/// Never persisted and never patched: a changed user is resolved again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    can_create_properties: bool,
    can_manage_properties: bool,
    can_view_properties: bool,
    can_make_reservations: bool,
    property_limit: PropertyLimit,
    subscription_tier: SubscriptionTier,
    permission_check: PermissionCheck,
}

impl Capabilities {
    /// Full capability set for privileged users.
    #[must_use]
    pub fn admin() -> Self {
        Self {
            can_create_properties: true,
            can_manage_properties: true,
            can_view_properties: true,
            can_make_reservations: true,
            property_limit: PropertyLimit::Unbounded,
            subscription_tier: SubscriptionTier::Admin,
            permission_check: PermissionCheck::Unrestricted,
        }
    }

    /// Most restrictive capability set: nothing granted.
    #[must_use]
    pub fn restricted() -> Self {
        Self::from_permissions(PermissionSet::new())
    }

    fn from_permissions(permissions: PermissionSet) -> Self {
        let permission_check = PermissionCheck::Granted(Arc::new(permissions));
        let can_create = permission_check.has(Permission::PropertyWrite);
        let can_view = permission_check.has(Permission::PropertyRead);

        Self {
            can_create_properties: can_create,
            can_manage_properties: can_view && can_create,
            can_view_properties: can_view,
            can_make_reservations: permission_check.has(Permission::ReservationWrite),
            property_limit: PropertyLimit::default(),
            subscription_tier: SubscriptionTier::Basic,
            permission_check,
        }
    }

    fn with_tier(mut self, tier: Option<SubscriptionTier>) -> Self {
        match tier {
            Some(SubscriptionTier::Premium) => {
                self.property_limit = PropertyLimit::Limited(PREMIUM_PROPERTY_LIMIT);
                self.subscription_tier = SubscriptionTier::Premium;
            }
            Some(SubscriptionTier::Esmeralda) => {
                self.property_limit = PropertyLimit::Unbounded;
                self.subscription_tier = SubscriptionTier::Esmeralda;
            }
            // Basic and unrecognized plans cannot publish regardless of grants.
            Some(SubscriptionTier::Basic | SubscriptionTier::Admin) | None => {
                self.can_create_properties = false;
                self.can_manage_properties = false;
                self.property_limit = PropertyLimit::Limited(0);
                self.subscription_tier = SubscriptionTier::Basic;
            }
        }
        self
    }

    /// Whether the user may publish new properties.
    #[must_use]
    pub fn can_create_properties(&self) -> bool {
        self.can_create_properties
    }

    /// Whether the user may edit and delete properties.
    #[must_use]
    pub fn can_manage_properties(&self) -> bool {
        self.can_manage_properties
    }

    /// Whether the user may browse property listings.
    #[must_use]
    pub fn can_view_properties(&self) -> bool {
        self.can_view_properties
    }

    /// Whether the user may book reservations.
    #[must_use]
    pub fn can_make_reservations(&self) -> bool {
        self.can_make_reservations
    }

    /// Property quota.
    #[must_use]
    pub fn property_limit(&self) -> PropertyLimit {
        self.property_limit
    }

    /// Resolved tier.
    #[must_use]
    pub fn subscription_tier(&self) -> SubscriptionTier {
        self.subscription_tier
    }

    /// The captured permission check.
    #[must_use]
    pub fn permission_check(&self) -> &PermissionCheck {
        &self.permission_check
    }

    /// Whether these are the privileged capabilities.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.subscription_tier == SubscriptionTier::Admin
    }

    /// Returns whether a gated action is allowed.
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::CreateProperties => self.can_create_properties,
            Capability::ManageProperties => self.can_manage_properties,
            Capability::ViewProperties => self.can_view_properties,
            Capability::MakeReservations => self.can_make_reservations,
        }
    }

    /// Returns whether the user may publish one more property while already
    /// owning `current_count`.
    #[must_use]
    pub fn can_add_property(&self, current_count: u32) -> bool {
        self.can_create_properties && self.property_limit.allows_another(current_count)
    }
}

impl PermissionPredicate for Capabilities {
    fn has_permission(&self, name: &str) -> bool {
        self.permission_check.has_permission(name)
    }
}

/// Resolves the capabilities of a user. Never fails.
///
/// Superuser or staff flags, or an admin-like role in any casing, yield
/// [`Capabilities::admin`]. Everyone else gets permission-derived
/// capabilities, and `CLIENT` users holding a subscription additionally get
/// their tier's quota and publishing restrictions.
#[must_use]
pub fn resolve_capabilities(user: &User) -> Capabilities {
    let role = user.role();
    if user.is_superuser() || user.is_staff() || role.is_privileged() {
        return Capabilities::admin();
    }

    let base = Capabilities::from_permissions(user.permissions().clone());

    match (role, user.subscription()) {
        (Role::Client, Some(subscription)) => base.with_tier(subscription.tier()),
        _ => base,
    }
}

#[cfg(test)]
mod tests;
