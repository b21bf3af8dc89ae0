//! Ports for the authentication backend and the persisted session store.

use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use habita_core::{AppError, AppResult, AuthTokens, NonEmptyString};
use habita_domain::User;
use serde::{Deserialize, Serialize};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Credentials for a password login.
#[derive(Clone)]
pub struct LoginRequest {
    /// Email or username, as the backend accepts either.
    pub identifier: String,
    /// Plaintext password.
    pub password: String,
}

impl LoginRequest {
    /// Creates login credentials.
    #[must_use]
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
        }
    }

    /// Rejects blank credentials before any network call.
    pub fn validate(&self) -> AppResult<()> {
        NonEmptyString::new(self.identifier.as_str())?;
        if self.password.is_empty() {
            return Err(AppError::Validation("password must not be empty".to_owned()));
        }
        Ok(())
    }
}

impl Debug for LoginRequest {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("LoginRequest")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parameters for a self-service registration.
#[derive(Clone)]
pub struct RegisterRequest {
    /// Desired username.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Repeated password typed by the user.
    pub password_confirmation: String,
}

impl RegisterRequest {
    /// Validates the request before it is sent to the backend.
    pub fn validate(&self) -> AppResult<()> {
        NonEmptyString::new(self.username.as_str())?;

        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => {
                return Err(AppError::Validation(format!(
                    "email address '{email}' is not valid"
                )));
            }
        }

        if self.password.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "password must be at least {PASSWORD_MIN_LENGTH} characters"
            )));
        }

        if self.password != self.password_confirmation {
            return Err(AppError::Validation(
                "password confirmation does not match".to_owned(),
            ));
        }

        Ok(())
    }
}

impl Debug for RegisterRequest {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Editable profile fields. Unset fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name.
    pub display_name: Option<String>,
    /// New contact email.
    pub email: Option<String>,
}

impl ProfileUpdate {
    /// Requires at least one non-blank field.
    pub fn validate(&self) -> AppResult<()> {
        let has_change = [&self.display_name, &self.email]
            .into_iter()
            .flatten()
            .any(|value| !value.trim().is_empty());

        if !has_change {
            return Err(AppError::Validation(
                "profile update must change at least one field".to_owned(),
            ));
        }

        Ok(())
    }
}

/// Successful login or registration outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// User record returned by the backend.
    pub user: User,
    /// Tokens issued for the new session.
    pub tokens: AuthTokens,
}

/// Session snapshot held by a [`SessionStore`].
///
/// Only the user and tokens are kept; capabilities are always recomputed on
/// restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    /// Last known user record.
    pub user: User,
    /// Session tokens.
    pub tokens: AuthTokens,
    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,
}

impl PersistedSession {
    /// Captures a snapshot stamped with the current time.
    #[must_use]
    pub fn capture(user: User, tokens: AuthTokens) -> Self {
        Self {
            user,
            tokens,
            saved_at: Utc::now(),
        }
    }
}

/// Port for the authentication backend.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Authenticates with credentials and returns the user and fresh tokens.
    async fn login(&self, request: &LoginRequest) -> AppResult<AuthenticatedUser>;

    /// Registers a new account and signs it in.
    async fn register(&self, request: &RegisterRequest) -> AppResult<AuthenticatedUser>;

    /// Fetches the current profile for the token holder.
    async fn fetch_profile(&self, tokens: &AuthTokens) -> AppResult<User>;

    /// Applies a profile update and returns the updated user.
    async fn update_profile(&self, tokens: &AuthTokens, update: &ProfileUpdate)
    -> AppResult<User>;
}

/// Port for the persisted session store (the client's local storage).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the stored session, if any.
    async fn load(&self) -> AppResult<Option<PersistedSession>>;

    /// Replaces the stored session.
    async fn save(&self, session: &PersistedSession) -> AppResult<()>;

    /// Removes the stored session. Clearing an empty store succeeds.
    async fn clear(&self) -> AppResult<()>;
}
