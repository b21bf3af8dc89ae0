use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};

use crate::{AppResult, NonEmptyString};

/// Bearer tokens issued by the authentication backend for one session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    access: NonEmptyString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh: Option<String>,
}

impl AuthTokens {
    /// Creates a token pair. The access token must not be blank.
    pub fn new(access: impl Into<String>, refresh: Option<String>) -> AppResult<Self> {
        let refresh = refresh.and_then(|value| {
            let trimmed = value.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        });

        Ok(Self {
            access: NonEmptyString::new(access)?,
            refresh,
        })
    }

    /// Returns the access token sent as `Authorization: Bearer`.
    #[must_use]
    pub fn access(&self) -> &str {
        self.access.as_str()
    }

    /// Returns the refresh token, if the backend issued one.
    #[must_use]
    pub fn refresh(&self) -> Option<&str> {
        self.refresh.as_deref()
    }
}

// Tokens are credentials; keep them out of logs.
impl Debug for AuthTokens {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AuthTokens")
            .field("access", &"<redacted>")
            .field("refresh", &self.refresh.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
