//! Application services and ports.

#![forbid(unsafe_code)]

mod session_context;
mod session_ports;
mod session_service;

pub use session_context::{AccessRequirement, ActiveSession, SessionContext};
pub use session_ports::{
    AuthBackend, AuthenticatedUser, LoginRequest, PASSWORD_MIN_LENGTH, PersistedSession,
    ProfileUpdate, RegisterRequest, SessionStore,
};
pub use session_service::SessionService;
