use async_trait::async_trait;
use habita_application::{PersistedSession, SessionStore};
use habita_core::AppResult;
use tokio::sync::RwLock;

/// In-memory session store for embedding and tests.
#[derive(Default)]
pub struct InMemorySessionStore {
    session: RwLock<Option<PersistedSession>>,
}

impl InMemorySessionStore {
    /// Creates an empty in-memory session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self) -> AppResult<Option<PersistedSession>> {
        Ok(self.session.read().await.clone())
    }

    async fn save(&self, session: &PersistedSession) -> AppResult<()> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.session.write().await.take();
        Ok(())
    }
}
