use habita_domain::{Capabilities, PermissionCheck, User};
use serde::Serialize;
use ts_rs::TS;

/// Capabilities of the current user as printed by the CLI.
///
/// `property_limit` is `null` when unbounded. `permissions` lists explicit
/// grants and is empty for privileged users, who pass every check.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../bindings/capabilities-response.ts")]
pub struct CapabilitiesResponse {
    pub user_id: String,
    pub role: String,
    pub display_name: Option<String>,
    pub can_create_properties: bool,
    pub can_manage_properties: bool,
    pub can_view_properties: bool,
    pub can_make_reservations: bool,
    pub property_limit: Option<u32>,
    pub subscription_tier: String,
    pub is_privileged: bool,
    pub permissions: Vec<String>,
}

impl CapabilitiesResponse {
    pub fn new(user: &User, capabilities: &Capabilities) -> Self {
        let permissions = match capabilities.permission_check() {
            PermissionCheck::Unrestricted => Vec::new(),
            PermissionCheck::Granted(granted) => granted.iter().map(str::to_owned).collect(),
        };

        Self {
            user_id: user.id().to_string(),
            role: user.raw_role().to_owned(),
            display_name: user.display_name().map(str::to_owned),
            can_create_properties: capabilities.can_create_properties(),
            can_manage_properties: capabilities.can_manage_properties(),
            can_view_properties: capabilities.can_view_properties(),
            can_make_reservations: capabilities.can_make_reservations(),
            property_limit: capabilities.property_limit().into(),
            subscription_tier: capabilities.subscription_tier().as_str().to_owned(),
            is_privileged: capabilities.is_privileged(),
            permissions,
        }
    }
}
