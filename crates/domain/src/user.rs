//! User record as supplied by the authentication backend.
//!
//! The backend payload is loosely typed. [`User::from_backend_payload`]
//! never fails: any missing or wrong-typed field is read as absent, which is
//! always the most restrictive interpretation for capability resolution.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{PermissionSet, Role, Subscription};

/// Opaque user identifier assigned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a backend identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Authenticated user as known to the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    id: UserId,
    role: String,
    is_superuser: bool,
    is_staff: bool,
    permissions: PermissionSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    subscription: Option<Subscription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
}

impl User {
    /// Creates a user with no flags, permissions or subscription.
    #[must_use]
    pub fn new(id: UserId, role: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
            ..Self::default()
        }
    }

    /// Sets the superuser flag.
    #[must_use]
    pub fn with_superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = is_superuser;
        self
    }

    /// Sets the staff flag.
    #[must_use]
    pub fn with_staff(mut self, is_staff: bool) -> Self {
        self.is_staff = is_staff;
        self
    }

    /// Replaces the granted permission set.
    #[must_use]
    pub fn with_permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions;
        self
    }

    /// Attaches a subscription.
    #[must_use]
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscription = Some(subscription);
        self
    }

    /// Sets the contact email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Returns the backend identifier.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the raw role tag exactly as the backend sent it.
    #[must_use]
    pub fn raw_role(&self) -> &str {
        self.role.as_str()
    }

    /// Returns the normalized role.
    #[must_use]
    pub fn role(&self) -> Role {
        Role::parse(self.role.as_str())
    }

    /// Returns the superuser flag.
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    /// Returns the staff flag.
    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    /// Returns the flattened permission set.
    #[must_use]
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Returns the subscription, if any.
    #[must_use]
    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    /// Returns the contact email, if any.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the display name, if any.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Decodes a backend user payload without ever failing.
    ///
    /// Accepts snake_case and camelCase flag keys. Permissions may be a list
    /// of names, a list of objects carrying `name` or `codename`, or nested
    /// under an object-valued `role`; all sources are merged. A subscription
    /// may be an object with `name`/`status` or just the plan name.
    #[must_use]
    pub fn from_backend_payload(payload: &Value) -> Self {
        let Some(object) = payload.as_object() else {
            return Self::default();
        };

        let mut permissions = PermissionSet::new();
        collect_permission_names(object.get("permissions"), &mut permissions);

        let role = match object.get("role").or_else(|| object.get("rol")) {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Object(role_object)) => {
                collect_permission_names(role_object.get("permissions"), &mut permissions);
                string_field(role_object, &["name", "nombre"]).unwrap_or_default()
            }
            _ => String::new(),
        };

        Self {
            id: UserId(id_field(object.get("id"))),
            role,
            is_superuser: bool_field(object, &["is_superuser", "isSuperuser"]),
            is_staff: bool_field(object, &["is_staff", "isStaff"]),
            permissions,
            subscription: subscription_field(object.get("subscription")),
            email: string_field(object, &["email"]),
            display_name: string_field(object, &["display_name", "displayName", "username"]),
        }
    }
}

fn id_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    }
}

fn bool_field(object: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_bool))
        .unwrap_or(false)
}

fn string_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
}

fn collect_permission_names(value: Option<&Value>, permissions: &mut PermissionSet) {
    let Some(Value::Array(entries)) = value else {
        return;
    };

    for entry in entries {
        match entry {
            Value::String(name) => permissions.insert(name.as_str()),
            Value::Object(permission) => {
                if let Some(name) = string_field(permission, &["name", "codename"]) {
                    permissions.insert(name);
                }
            }
            _ => {}
        }
    }
}

fn subscription_field(value: Option<&Value>) -> Option<Subscription> {
    match value {
        Some(Value::String(name)) if !name.trim().is_empty() => {
            Some(Subscription::new(name.as_str(), ""))
        }
        Some(Value::Object(subscription)) => {
            let name = string_field(subscription, &["name", "nombre"])?;
            let status = string_field(subscription, &["status", "estado"]).unwrap_or_default();
            Some(Subscription::new(name, status))
        }
        _ => None,
    }
}
