//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPPER_API_URL` - Base URL of the REST backend (http or https)
//!
//! ## Optional
//! - `SHOPPER_HOME_PATH` - Landing route after login/signup (default: /home)
//! - `SHOPPER_LOGIN_PATH` - Landing route after logout (default: /login)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use thiserror::Error;
use url::Url;

use crate::collaborators::Routes;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend
    pub api_url: Url,
    /// Landing routes for auth transitions
    pub routes: Routes,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `SHOPPER_API_URL` is missing or any variable
    /// is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url("SHOPPER_API_URL", &get_required_env("SHOPPER_API_URL")?)?;
        let routes = Routes {
            home: parse_route("SHOPPER_HOME_PATH", get_env_or_default("SHOPPER_HOME_PATH", "/home"))?,
            login: parse_route(
                "SHOPPER_LOGIN_PATH",
                get_env_or_default("SHOPPER_LOGIN_PATH", "/login"),
            )?,
        };
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api_url,
            routes,
            sentry_dsn,
        })
    }

    /// Configuration for a backend at `api_url` with default routes.
    #[must_use]
    pub fn for_url(api_url: Url) -> Self {
        Self {
            api_url,
            routes: Routes::default(),
            sentry_dsn: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_api_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }

    Ok(url)
}

fn parse_route(key: &str, value: String) -> Result<String, ConfigError> {
    if value.starts_with('/') {
        Ok(value)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("route must start with '/': {value}"),
        ))
    }
}
