//! Session lifecycle orchestration around a [`SessionContext`].
//!
//! The context is a plain value owned by the caller; this service only
//! drives it through the backend and store ports.

use std::sync::Arc;

use habita_core::{AppError, AppResult, AuthTokens};
use habita_domain::User;

use crate::{
    ActiveSession, AuthBackend, LoginRequest, PersistedSession, ProfileUpdate, RegisterRequest,
    SessionContext, SessionStore,
};

/// Application service for login, registration, restore, profile updates
/// and logout.
#[derive(Clone)]
pub struct SessionService {
    auth_backend: Arc<dyn AuthBackend>,
    session_store: Arc<dyn SessionStore>,
}

impl SessionService {
    /// Creates a session service from its ports.
    #[must_use]
    pub fn new(auth_backend: Arc<dyn AuthBackend>, session_store: Arc<dyn SessionStore>) -> Self {
        Self {
            auth_backend,
            session_store,
        }
    }

    /// Signs in and persists the new session.
    ///
    /// A failed login leaves the context untouched.
    pub async fn login<'a>(
        &self,
        context: &'a mut SessionContext,
        request: LoginRequest,
    ) -> AppResult<&'a ActiveSession> {
        request.validate()?;
        let authenticated = self.auth_backend.login(&request).await?;
        self.persist(&authenticated.user, &authenticated.tokens)
            .await?;

        Ok(context.establish(authenticated.user, authenticated.tokens))
    }

    /// Registers an account, signs it in and persists the session.
    pub async fn register<'a>(
        &self,
        context: &'a mut SessionContext,
        request: RegisterRequest,
    ) -> AppResult<&'a ActiveSession> {
        request.validate()?;
        let authenticated = self.auth_backend.register(&request).await?;
        self.persist(&authenticated.user, &authenticated.tokens)
            .await?;

        Ok(context.establish(authenticated.user, authenticated.tokens))
    }

    /// Restores the persisted session into the context.
    ///
    /// Capabilities are resolved from the stored user, never read from
    /// storage. Returns whether a session was restored; an empty store
    /// leaves the context anonymous.
    pub async fn restore(&self, context: &mut SessionContext) -> AppResult<bool> {
        match self.session_store.load().await? {
            Some(persisted) => {
                context.establish(persisted.user, persisted.tokens);
                Ok(true)
            }
            None => {
                context.destroy();
                Ok(false)
            }
        }
    }

    /// Refetches the profile from the backend and resolves it again.
    ///
    /// A rejected token ends the session locally before the error is
    /// returned.
    pub async fn refresh_profile<'a>(
        &self,
        context: &'a mut SessionContext,
    ) -> AppResult<&'a ActiveSession> {
        let tokens = context
            .tokens()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no active session".to_owned()))?;

        let user = match self.auth_backend.fetch_profile(&tokens).await {
            Ok(user) => user,
            Err(error) => return Err(self.end_session_on_rejection(context, error).await),
        };

        self.persist(&user, &tokens).await?;
        context.replace_user(user)
    }

    /// Sends a profile update and replaces the session user with the result.
    pub async fn update_profile<'a>(
        &self,
        context: &'a mut SessionContext,
        update: ProfileUpdate,
    ) -> AppResult<&'a ActiveSession> {
        update.validate()?;
        let tokens = context
            .tokens()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no active session".to_owned()))?;

        let user = match self.auth_backend.update_profile(&tokens, &update).await {
            Ok(user) => user,
            Err(error) => return Err(self.end_session_on_rejection(context, error).await),
        };

        self.persist(&user, &tokens).await?;
        context.replace_user(user)
    }

    /// Ends the session and clears the store. Returns whether a session was
    /// active in the context.
    pub async fn logout(&self, context: &mut SessionContext) -> AppResult<bool> {
        let was_active = context.destroy();
        self.session_store.clear().await?;
        Ok(was_active)
    }

    async fn persist(&self, user: &User, tokens: &AuthTokens) -> AppResult<()> {
        self.session_store
            .save(&PersistedSession::capture(user.clone(), tokens.clone()))
            .await
    }

    async fn end_session_on_rejection(
        &self,
        context: &mut SessionContext,
        error: AppError,
    ) -> AppError {
        if !matches!(error, AppError::Unauthorized(_)) {
            return error;
        }

        context.destroy();
        match self.session_store.clear().await {
            Ok(()) => error,
            Err(clear_error) => AppError::Internal(format!(
                "{error}; additionally failed to clear stored session: {clear_error}"
            )),
        }
    }
}
