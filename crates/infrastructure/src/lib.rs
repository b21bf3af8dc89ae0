//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod file_session_store;
mod http_auth_backend;
mod in_memory_session_store;
mod redis_session_store;

pub use file_session_store::FileSessionStore;
pub use http_auth_backend::HttpAuthBackend;
pub use in_memory_session_store::InMemorySessionStore;
pub use redis_session_store::RedisSessionStore;
