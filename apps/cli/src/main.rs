//! Habita session and capability command-line client.

#![forbid(unsafe_code)]

mod command;
mod config;
mod dto;

use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use habita_application::{
    ActiveSession, LoginRequest, RegisterRequest, SessionContext, SessionService, SessionStore,
};
use habita_core::{AppError, AppResult};
use habita_domain::{User, resolve_capabilities};
use habita_infrastructure::{FileSessionStore, HttpAuthBackend, RedisSessionStore};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::command::{Command, SessionCommand};
use crate::config::{CliConfig, SessionBackend};
use crate::dto::CapabilitiesResponse;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    match Command::parse(env::args().skip(1))? {
        Command::Resolve { payload_path } => resolve_offline(&payload_path).await,
        Command::Session(command) => run_session_command(command).await,
    }
}

async fn run_session_command(command: SessionCommand) -> AppResult<()> {
    let config = CliConfig::load()?;
    let service = build_session_service(&config)?;
    let mut context = SessionContext::new();

    info!(
        api_base_url = %config.api_base_url,
        session_backend = session_backend_label(&config.session_backend),
        "habita cli started"
    );

    match command {
        SessionCommand::Login {
            identifier,
            password,
        } => {
            let session = service
                .login(&mut context, LoginRequest::new(identifier, password))
                .await?;
            info!(user_id = %session.user().id(), "signed in");
            print_session(session)
        }
        SessionCommand::Register {
            username,
            email,
            password,
        } => {
            let request = RegisterRequest {
                username,
                email,
                password_confirmation: password.clone(),
                password,
            };
            let session = service.register(&mut context, request).await?;
            info!(user_id = %session.user().id(), "registered and signed in");
            print_session(session)
        }
        SessionCommand::Whoami => {
            require_restored(&service, &mut context).await?;
            match context.current() {
                Some(session) => print_session(session),
                None => Err(AppError::Unauthorized("no active session".to_owned())),
            }
        }
        SessionCommand::Refresh => {
            require_restored(&service, &mut context).await?;
            let session = service.refresh_profile(&mut context).await?;
            info!(user_id = %session.user().id(), "profile refreshed");
            print_session(session)
        }
        SessionCommand::Check { requirement } => {
            require_restored(&service, &mut context).await?;
            match context.require(&requirement) {
                Ok(()) => {
                    info!(requirement = %requirement, "requirement satisfied");
                    Ok(())
                }
                Err(error) => {
                    warn!(requirement = %requirement, error = %error, "requirement not satisfied");
                    Err(error)
                }
            }
        }
        SessionCommand::Logout => {
            service.restore(&mut context).await?;
            let was_active = service.logout(&mut context).await?;
            info!(was_active, "signed out");
            Ok(())
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn build_session_service(config: &CliConfig) -> AppResult<SessionService> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;
    let auth_backend = HttpAuthBackend::new(http_client, config.api_base_url.clone());

    let session_store: Arc<dyn SessionStore> = match &config.session_backend {
        SessionBackend::File(path) => Arc::new(FileSessionStore::new(path.clone())),
        SessionBackend::Redis {
            url,
            key,
            ttl_seconds,
        } => {
            let client = redis::Client::open(url.as_str()).map_err(|error| {
                AppError::Validation(format!("invalid HABITA_REDIS_URL: {error}"))
            })?;
            Arc::new(RedisSessionStore::new(client, key.clone(), *ttl_seconds))
        }
    };

    Ok(SessionService::new(Arc::new(auth_backend), session_store))
}

async fn require_restored(service: &SessionService, context: &mut SessionContext) -> AppResult<()> {
    if service.restore(context).await? {
        return Ok(());
    }

    Err(AppError::Unauthorized(
        "no stored session, run `habita login` first".to_owned(),
    ))
}

async fn resolve_offline(payload_path: &Path) -> AppResult<()> {
    let raw = tokio::fs::read_to_string(payload_path)
        .await
        .map_err(|error| {
            AppError::Validation(format!(
                "failed to read user payload '{}': {error}",
                payload_path.display()
            ))
        })?;
    let payload: Value = serde_json::from_str(raw.as_str()).map_err(|error| {
        AppError::Validation(format!(
            "user payload '{}' is not valid JSON: {error}",
            payload_path.display()
        ))
    })?;

    let user = User::from_backend_payload(&payload);
    let capabilities = resolve_capabilities(&user);
    print_json(&CapabilitiesResponse::new(&user, &capabilities))
}

fn print_session(session: &ActiveSession) -> AppResult<()> {
    print_json(&CapabilitiesResponse::new(
        session.user(),
        session.capabilities(),
    ))
}

fn print_json(value: &impl Serialize) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|error| AppError::Internal(format!("failed to render output: {error}")))?;
    println!("{rendered}");
    Ok(())
}

fn session_backend_label(backend: &SessionBackend) -> &'static str {
    match backend {
        SessionBackend::File(_) => "file",
        SessionBackend::Redis { .. } => "redis",
    }
}
