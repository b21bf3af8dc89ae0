use std::env;
use std::path::PathBuf;

use habita_core::{AppError, AppResult};
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_SESSION_FILE: &str = ".habita-session.json";
const DEFAULT_REDIS_KEY: &str = "habita:session";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Where the CLI keeps the persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionBackend {
    File(PathBuf),
    Redis {
        url: String,
        key: String,
        ttl_seconds: Option<u64>,
    },
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub api_base_url: Url,
    pub session_backend: SessionBackend,
    pub http_timeout_secs: u64,
}

impl CliConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let raw_base_url =
            non_blank("HABITA_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let api_base_url = Url::parse(raw_base_url.as_str()).map_err(|error| {
            AppError::Validation(format!(
                "invalid HABITA_API_BASE_URL value '{raw_base_url}': {error}"
            ))
        })?;
        if !matches!(api_base_url.scheme(), "http" | "https") {
            return Err(AppError::Validation(format!(
                "HABITA_API_BASE_URL must use http or https, got '{}'",
                api_base_url.scheme()
            )));
        }

        let session_backend = match non_blank("HABITA_SESSION_BACKEND")
            .unwrap_or_else(|| "file".to_owned())
            .to_lowercase()
            .as_str()
        {
            "file" => SessionBackend::File(PathBuf::from(
                non_blank("HABITA_SESSION_FILE").unwrap_or_else(|| DEFAULT_SESSION_FILE.to_owned()),
            )),
            "redis" => SessionBackend::Redis {
                url: non_blank("HABITA_REDIS_URL").ok_or_else(|| {
                    AppError::Validation(
                        "HABITA_REDIS_URL is required when HABITA_SESSION_BACKEND=redis"
                            .to_owned(),
                    )
                })?,
                key: non_blank("HABITA_REDIS_KEY").unwrap_or_else(|| DEFAULT_REDIS_KEY.to_owned()),
                ttl_seconds: parse_u64(&non_blank, "HABITA_REDIS_TTL_SECS")?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "unknown HABITA_SESSION_BACKEND value '{other}'"
                )));
            }
        };

        let http_timeout_secs = parse_u64(&non_blank, "HABITA_HTTP_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        if http_timeout_secs == 0 {
            return Err(AppError::Validation(
                "HABITA_HTTP_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            api_base_url,
            session_backend,
            http_timeout_secs,
        })
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<Option<u64>> {
    lookup(name)
        .map(|value| {
            value.parse::<u64>().map_err(|error| {
                AppError::Validation(format!("invalid {name} value '{value}': {error}"))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use super::{CliConfig, SessionBackend};

    fn config_from(pairs: &[(&str, &str)]) -> Result<CliConfig, String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        CliConfig::from_lookup(|name| values.get(name).cloned()).map_err(|error| error.to_string())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config_from(&[]).unwrap_or_else(|error| panic!("{error}"));
        assert_eq!(config.api_base_url.as_str(), "http://127.0.0.1:8000/api");
        assert_eq!(
            config.session_backend,
            SessionBackend::File(PathBuf::from(".habita-session.json"))
        );
        assert_eq!(config.http_timeout_secs, 15);
    }

    #[test]
    fn redis_backend_requires_url() {
        assert!(config_from(&[("HABITA_SESSION_BACKEND", "redis")]).is_err());

        let config = config_from(&[
            ("HABITA_SESSION_BACKEND", "Redis"),
            ("HABITA_REDIS_URL", "redis://127.0.0.1:6379"),
            ("HABITA_REDIS_TTL_SECS", "86400"),
        ])
        .unwrap_or_else(|error| panic!("{error}"));
        assert_eq!(
            config.session_backend,
            SessionBackend::Redis {
                url: "redis://127.0.0.1:6379".to_owned(),
                key: "habita:session".to_owned(),
                ttl_seconds: Some(86400),
            }
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config_from(&[("HABITA_API_BASE_URL", "not a url")]).is_err());
        assert!(config_from(&[("HABITA_API_BASE_URL", "ftp://habita.test")]).is_err());
        assert!(config_from(&[("HABITA_HTTP_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("HABITA_HTTP_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_from(&[("HABITA_SESSION_BACKEND", "cookie")]).is_err());
        assert!(config_from(&[("HABITA_SESSION_BACKEND", "memory")]).is_err());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("HABITA_SESSION_BACKEND", "  "), ("HABITA_SESSION_FILE", "")])
            .unwrap_or_else(|error| panic!("{error}"));
        assert_eq!(
            config.session_backend,
            SessionBackend::File(PathBuf::from(".habita-session.json"))
        );
    }
}
