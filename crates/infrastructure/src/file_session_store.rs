//! JSON file session store, the desktop counterpart of browser local storage.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use habita_application::{PersistedSession, SessionStore};
use habita_core::{AppError, AppResult};
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Session store keeping one JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Creates a store backed by `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> AppResult<Option<PersistedSession>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(AppError::Internal(format!(
                    "failed to read session file '{}': {error}",
                    self.path.display()
                )));
            }
        };

        match serde_json::from_str::<PersistedSession>(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    error = %error,
                    "ignoring unreadable session file"
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &PersistedSession) -> AppResult<()> {
        let encoded = serde_json::to_vec_pretty(session)
            .map_err(|error| AppError::Internal(format!("failed to encode session: {error}")))?;

        if let Some(parent) = self.path.parent().filter(|value| !value.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                AppError::Internal(format!(
                    "failed to create session directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        // Write then rename so a crash never leaves a half-written session.
        let staging_path = self.staging_path();
        write_owner_only(&staging_path, &encoded)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to write session file '{}': {error}",
                    staging_path.display()
                ))
            })?;
        tokio::fs::rename(&staging_path, &self.path)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to move session file into '{}': {error}",
                    self.path.display()
                ))
            })
    }

    async fn clear(&self) -> AppResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(AppError::Internal(format!(
                "failed to remove session file '{}': {error}",
                self.path.display()
            ))),
        }
    }
}

// The session holds bearer tokens, so the file is created readable by its
// owner only.
async fn write_owner_only(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(error) if error.kind() == ErrorKind::NotFound => {}
        Err(error) => return Err(error),
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await
}
