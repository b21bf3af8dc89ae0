//! Explicit session state: the single slot holding the current user, its
//! tokens and the capabilities resolved from it.

mod access;

use habita_core::{AppError, AppResult, AuthTokens};
use habita_domain::{Capabilities, User, resolve_capabilities};

pub use access::AccessRequirement;

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    user: User,
    tokens: AuthTokens,
    capabilities: Capabilities,
}

impl ActiveSession {
    fn new(user: User, tokens: AuthTokens) -> Self {
        let capabilities = resolve_capabilities(&user);
        Self {
            user,
            tokens,
            capabilities,
        }
    }

    /// The signed-in user.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    /// The session tokens.
    #[must_use]
    pub fn tokens(&self) -> &AuthTokens {
        &self.tokens
    }

    /// Capabilities resolved from [`ActiveSession::user`].
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

/// Session lifecycle owner.
///
/// Every transition replaces the session wholesale. Capabilities are
/// resolved whenever a user enters the context and are never patched.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    current: Option<ActiveSession>,
}

impl SessionContext {
    /// Creates an anonymous context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for `user`, discarding any previous one.
    pub fn establish(&mut self, user: User, tokens: AuthTokens) -> &ActiveSession {
        self.current.insert(ActiveSession::new(user, tokens))
    }

    /// Swaps in an updated user record and resolves its capabilities again.
    pub fn replace_user(&mut self, user: User) -> AppResult<&ActiveSession> {
        let tokens = self.require_session()?.tokens.clone();
        Ok(self.establish(user, tokens))
    }

    /// Swaps in rotated tokens. The user and capabilities are unchanged.
    pub fn replace_tokens(&mut self, tokens: AuthTokens) -> AppResult<&ActiveSession> {
        let session = self
            .current
            .as_mut()
            .ok_or_else(|| AppError::Unauthorized("no active session".to_owned()))?;
        session.tokens = tokens;
        Ok(session)
    }

    /// Ends the session. Returns whether one was active.
    pub fn destroy(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// The active session, if any.
    #[must_use]
    pub fn current(&self) -> Option<&ActiveSession> {
        self.current.as_ref()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.current.as_ref().map(ActiveSession::user)
    }

    /// The session tokens, if any.
    #[must_use]
    pub fn tokens(&self) -> Option<&AuthTokens> {
        self.current.as_ref().map(ActiveSession::tokens)
    }

    /// The current capabilities, if any.
    #[must_use]
    pub fn capabilities(&self) -> Option<&Capabilities> {
        self.current.as_ref().map(ActiveSession::capabilities)
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Checks an access requirement against the current session.
    ///
    /// Fails with `Unauthorized` when anonymous and `Forbidden` when the
    /// session does not satisfy the requirement.
    pub fn require(&self, requirement: &AccessRequirement) -> AppResult<()> {
        let session = self.require_session()?;
        if requirement.is_satisfied_by(&session.capabilities) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' does not satisfy requirement '{requirement}'",
            session.user.id()
        )))
    }

    fn require_session(&self) -> AppResult<&ActiveSession> {
        self.current
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("no active session".to_owned()))
    }
}
