use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::info;

/// Award calls go to the learn host unless overridden.
pub const DEFAULT_LEARN_DOMAIN: &str = "api-learn.ispringlearn.ru";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {0} is not set")]
    Missing(&'static str),

    #[error("Invalid {key} value: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Loaded once at startup and passed by reference into every client.
pub struct Config {
    pub port: u16,
    pub client_id: String,
    pub client_secret: String,
    pub auth_base_url: String,
    pub api_base_url: String,
    pub learn_base_url: String,
    pub store_url: String,
    pub store_service_key: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("RUST_PORT", "8080")?,
            client_id: required("ISPRING_CLIENT_ID")?,
            client_secret: required("ISPRING_CLIENT_SECRET")?,
            auth_base_url: base_url(required("ISPRING_DOMAIN")?),
            api_base_url: base_url(required("ISPRING_API_DOMAIN")?),
            learn_base_url: base_url(try_load("ISPRING_LEARN_DOMAIN", DEFAULT_LEARN_DOMAIN)?),
            store_url: required("STORE_URL")?,
            store_service_key: required("STORE_SERVICE_KEY")?,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        })
}

fn base_url(domain: String) -> String {
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain
    } else {
        format!("https://{domain}")
    }
}

#[cfg(test)]
mod tests {
    use super::base_url;

    #[test]
    fn test_bare_domain_gets_https() {
        assert_eq!(base_url("example.com".into()), "https://example.com");
    }

    #[test]
    fn test_explicit_scheme_kept() {
        assert_eq!(
            base_url("http://127.0.0.1:9000".into()),
            "http://127.0.0.1:9000"
        );
        assert_eq!(base_url("https://lms.example".into()), "https://lms.example");
    }
}
