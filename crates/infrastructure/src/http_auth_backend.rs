//! REST client for the Habita authentication backend.

use async_trait::async_trait;
use habita_application::{
    AuthBackend, AuthenticatedUser, LoginRequest, ProfileUpdate, RegisterRequest,
};
use habita_core::{AppError, AppResult, AuthTokens};
use habita_domain::User;
use reqwest::StatusCode;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};
use url::Url;

const LOGIN_PATH: &str = "auth/login/";
const REGISTER_PATH: &str = "auth/register/";
const PROFILE_PATH: &str = "auth/profile/";

/// HTTP implementation of the authentication backend port.
#[derive(Clone)]
pub struct HttpAuthBackend {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpAuthBackend {
    /// Creates a backend client rooted at `base_url`.
    ///
    /// Endpoint paths are resolved relative to the base, so a base of
    /// `https://host/api` and `https://host/api/` behave the same.
    #[must_use]
    pub fn new(http_client: reqwest::Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(path.as_str());
        }

        Self {
            http_client,
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url.join(path).map_err(|error| {
            AppError::Internal(format!("invalid auth endpoint '{path}': {error}"))
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder, operation: &str) -> AppResult<Value> {
        let response = request.send().await.map_err(|error| {
            AppError::Internal(format!("failed to call {operation} endpoint: {error}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            warn!(
                operation,
                status = status.as_u16(),
                "auth backend rejected request"
            );
            return Err(status_error(status, operation, body.as_str()));
        }

        let body = response.json::<Value>().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to parse {operation} endpoint response body: {error}"
            ))
        })?;
        debug!(operation, "auth backend request succeeded");

        Ok(body)
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, request: &LoginRequest) -> AppResult<AuthenticatedUser> {
        let endpoint = self.endpoint(LOGIN_PATH)?;
        let body = self
            .send(
                self.http_client.post(endpoint).json(&json!({
                    "username": request.identifier,
                    "password": request.password,
                })),
                "login",
            )
            .await
            .map_err(|error| match error {
                AppError::Validation(_) | AppError::Unauthorized(_) | AppError::Forbidden(_) => {
                    AppError::Unauthorized("invalid credentials".to_owned())
                }
                other => other,
            })?;

        parse_authenticated_user(&body)
    }

    async fn register(&self, request: &RegisterRequest) -> AppResult<AuthenticatedUser> {
        let endpoint = self.endpoint(REGISTER_PATH)?;
        let body = self
            .send(
                self.http_client.post(endpoint).json(&json!({
                    "username": request.username,
                    "email": request.email,
                    "password": request.password,
                    "password_confirmation": request.password_confirmation,
                })),
                "register",
            )
            .await?;

        parse_authenticated_user(&body)
    }

    async fn fetch_profile(&self, tokens: &AuthTokens) -> AppResult<User> {
        let endpoint = self.endpoint(PROFILE_PATH)?;
        let body = self
            .send(
                self.http_client
                    .get(endpoint)
                    .bearer_auth(tokens.access()),
                "profile",
            )
            .await?;

        Ok(parse_profile(&body))
    }

    async fn update_profile(
        &self,
        tokens: &AuthTokens,
        update: &ProfileUpdate,
    ) -> AppResult<User> {
        let endpoint = self.endpoint(PROFILE_PATH)?;
        let body = self
            .send(
                self.http_client
                    .patch(endpoint)
                    .bearer_auth(tokens.access())
                    .json(&profile_update_body(update)),
                "profile update",
            )
            .await?;

        Ok(parse_profile(&body))
    }
}

fn status_error(status: StatusCode, operation: &str, body: &str) -> AppError {
    let message = format!(
        "{operation} endpoint returned status {}: {body}",
        status.as_u16()
    );

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            AppError::Validation(message)
        }
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        _ => AppError::Internal(message),
    }
}

fn parse_authenticated_user(body: &Value) -> AppResult<AuthenticatedUser> {
    let user = body.get("user").ok_or_else(|| {
        AppError::Internal("auth response is missing the 'user' object".to_owned())
    })?;

    let token_source = body
        .get("tokens")
        .and_then(Value::as_object)
        .or_else(|| body.as_object());
    let access = token_source
        .and_then(|source| token_field(source, &["access", "access_token", "token"]))
        .ok_or_else(|| {
            AppError::Internal("auth response is missing an access token".to_owned())
        })?;
    let refresh =
        token_source.and_then(|source| token_field(source, &["refresh", "refresh_token"]));

    Ok(AuthenticatedUser {
        user: User::from_backend_payload(user),
        tokens: AuthTokens::new(access, refresh)?,
    })
}

fn parse_profile(body: &Value) -> User {
    User::from_backend_payload(body.get("user").unwrap_or(body))
}

fn token_field(source: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| source.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
}

// Blank fields are left out so the backend keeps the stored value.
fn profile_update_body(update: &ProfileUpdate) -> Value {
    let fields = [
        ("display_name", update.display_name.as_deref()),
        ("email", update.email.as_deref()),
    ];

    let body: Map<String, Value> = fields
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value?.trim();
            (!value.is_empty()).then(|| (key.to_owned(), Value::from(value)))
        })
        .collect();
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use habita_application::ProfileUpdate;
    use habita_core::AppError;
    use habita_domain::Role;
    use reqwest::StatusCode;
    use serde_json::json;
    use url::Url;

    use super::{
        HttpAuthBackend, LOGIN_PATH, parse_authenticated_user, parse_profile,
        profile_update_body, status_error,
    };

    fn backend(base: &str) -> HttpAuthBackend {
        let base_url =
            Url::parse(base).unwrap_or_else(|error| panic!("base url should parse: {error}"));
        HttpAuthBackend::new(reqwest::Client::new(), base_url)
    }

    #[test]
    fn endpoints_resolve_below_base_path() {
        let with_slash = backend("https://habita.test/api/").endpoint(LOGIN_PATH);
        let without_slash = backend("https://habita.test/api").endpoint(LOGIN_PATH);

        assert_eq!(
            with_slash.map(String::from).ok().as_deref(),
            Some("https://habita.test/api/auth/login/")
        );
        assert_eq!(
            without_slash.map(String::from).ok().as_deref(),
            Some("https://habita.test/api/auth/login/")
        );
    }

    #[test]
    fn login_response_with_top_level_tokens_is_parsed() {
        let parsed = parse_authenticated_user(&json!({
            "user": { "id": 3, "role": "CLIENT", "permissions": ["cud_reserva"] },
            "access": "acc",
            "refresh": "ref"
        }));

        let authenticated =
            parsed.unwrap_or_else(|error| panic!("response should parse: {error}"));
        assert_eq!(authenticated.user.role(), Role::Client);
        assert_eq!(authenticated.tokens.access(), "acc");
        assert_eq!(authenticated.tokens.refresh(), Some("ref"));
    }

    #[test]
    fn login_response_with_nested_tokens_is_parsed() {
        let parsed = parse_authenticated_user(&json!({
            "user": { "id": "u-1", "role": "ADMIN" },
            "tokens": { "access_token": "acc" }
        }));

        let authenticated =
            parsed.unwrap_or_else(|error| panic!("response should parse: {error}"));
        assert_eq!(authenticated.tokens.access(), "acc");
        assert_eq!(authenticated.tokens.refresh(), None);
    }

    #[test]
    fn login_response_without_access_token_is_rejected() {
        let parsed = parse_authenticated_user(&json!({ "user": { "id": 1 } }));
        assert!(matches!(parsed, Err(AppError::Internal(_))));

        let parsed = parse_authenticated_user(&json!({ "user": { "id": 1 }, "access": "  " }));
        assert!(matches!(parsed, Err(AppError::Validation(_))));
    }

    #[test]
    fn profile_accepts_wrapped_and_bare_user() {
        let wrapped = parse_profile(&json!({ "user": { "id": 1, "role": "CLIENT" } }));
        let bare = parse_profile(&json!({ "id": 1, "role": "CLIENT" }));
        assert_eq!(wrapped, bare);
    }

    #[test]
    fn status_codes_map_to_error_categories() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "profile", ""),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "profile", ""),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "register", "{}"),
            AppError::Validation(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "profile", ""),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn profile_update_body_only_carries_set_fields() {
        let body = profile_update_body(&ProfileUpdate {
            display_name: Some(" Ana ".to_owned()),
            email: None,
        });
        assert_eq!(body, json!({ "display_name": "Ana" }));
    }

    #[test]
    fn profile_update_body_skips_blank_fields() {
        let body = profile_update_body(&ProfileUpdate {
            display_name: Some("Ana".to_owned()),
            email: Some("   ".to_owned()),
        });
        assert_eq!(body, json!({ "display_name": "Ana" }));
        assert!(body.get("email").is_none());
    }
}
