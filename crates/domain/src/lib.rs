//! Domain entities and the capability resolver.

#![forbid(unsafe_code)]

mod capabilities;
mod permission;
mod property_limit;
mod role;
mod subscription;
mod user;

pub use capabilities::{
    Capabilities, Capability, PermissionCheck, PermissionPredicate, resolve_capabilities,
};
pub use permission::{Permission, PermissionSet};
pub use property_limit::{PREMIUM_PROPERTY_LIMIT, PropertyLimit};
pub use role::Role;
pub use subscription::{Subscription, SubscriptionTier};
pub use user::{User, UserId};
