//! Redis-backed session store for clients that share sessions across devices.

use async_trait::async_trait;
use habita_application::{PersistedSession, SessionStore};
use habita_core::{AppError, AppResult};
use redis::AsyncCommands;
use tracing::warn;

/// Redis implementation of the session store port.
#[derive(Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
    key: String,
    ttl_seconds: Option<u64>,
}

impl RedisSessionStore {
    /// Creates a store writing the session under `key`.
    ///
    /// With a TTL the stored session expires on its own; a zero TTL is read
    /// as no expiry.
    #[must_use]
    pub fn new(client: redis::Client, key: impl Into<String>, ttl_seconds: Option<u64>) -> Self {
        Self {
            client,
            key: key.into(),
            ttl_seconds: ttl_seconds.filter(|value| *value > 0),
        }
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self) -> AppResult<Option<PersistedSession>> {
        let mut connection = self.connection().await?;
        let encoded: Option<String> = connection.get(&self.key).await.map_err(|error| {
            AppError::Internal(format!("failed to read session '{}': {error}", self.key))
        })?;

        let Some(encoded) = encoded else {
            return Ok(None);
        };

        match serde_json::from_str::<PersistedSession>(&encoded) {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                warn!(key = %self.key, error = %error, "ignoring unreadable stored session");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &PersistedSession) -> AppResult<()> {
        let encoded = serde_json::to_string(session)
            .map_err(|error| AppError::Internal(format!("failed to encode session: {error}")))?;
        let mut connection = self.connection().await?;

        let result = match self.ttl_seconds {
            Some(ttl_seconds) => {
                connection
                    .set_ex::<_, _, ()>(&self.key, encoded, ttl_seconds)
                    .await
            }
            None => connection.set::<_, _, ()>(&self.key, encoded).await,
        };

        result.map_err(|error| {
            AppError::Internal(format!("failed to write session '{}': {error}", self.key))
        })
    }

    async fn clear(&self) -> AppResult<()> {
        let mut connection = self.connection().await?;
        connection
            .del::<_, i64>(&self.key)
            .await
            .map(|_| ())
            .map_err(|error| {
                AppError::Internal(format!("failed to delete session '{}': {error}", self.key))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::RedisSessionStore;

    #[test]
    fn zero_ttl_means_no_expiry() {
        let client = redis::Client::open("redis://127.0.0.1:6379")
            .unwrap_or_else(|error| panic!("redis url should parse: {error}"));

        let store = RedisSessionStore::new(client.clone(), "habita:session", Some(0));
        assert_eq!(store.ttl_seconds, None);

        let store = RedisSessionStore::new(client, "habita:session", Some(3600));
        assert_eq!(store.ttl_seconds, Some(3600));
    }
}
