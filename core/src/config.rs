//! API configuration.
//!
//! # Design
//! `ApiConfig` is built once and then shared read-only by every run. It keeps
//! both the plain and the secure base URL because the remote API publishes
//! both; authentication calls always go to the secure one since credentials
//! travel in the query string.

use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const TMDB_BASE_URL: &str = "http://api.themoviedb.org/3/";
pub const TMDB_SECURE_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Default transport timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const API_KEY_ENV: &str = "TMDB_API_KEY";
pub const BASE_URL_ENV: &str = "TMDB_BASE_URL";
pub const SECURE_BASE_URL_ENV: &str = "TMDB_SECURE_BASE_URL";
pub const TIMEOUT_ENV: &str = "TMDB_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API key is empty")]
    EmptyApiKey,

    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid timeout {0:?}: expected a whole number of seconds")]
    InvalidTimeout(String),
}

/// Immutable connection settings for the movie-database API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    api_key: String,
    base_url: String,
    secure_base_url: String,
    timeout: Duration,
}

impl ApiConfig {
    /// Use `base_url` for both the plain and the secure endpoint.
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        let base_url = normalize_base_url(base_url)?;
        Ok(Self {
            api_key,
            secure_base_url: base_url.clone(),
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Public TheMovieDB v3 endpoints.
    pub fn tmdb(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(api_key, TMDB_BASE_URL)?.with_secure_base_url(TMDB_SECURE_BASE_URL)
    }

    pub fn with_secure_base_url(mut self, secure_base_url: &str) -> Result<Self, ConfigError> {
        self.secure_base_url = normalize_base_url(secure_base_url)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `TMDB_API_KEY` (required) plus the optional URL and timeout
    /// overrides. Unset overrides fall back to the public endpoints.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_ENV).ok_or(ConfigError::MissingEnv(API_KEY_ENV))?;
        let base_url = lookup(BASE_URL_ENV).unwrap_or_else(|| TMDB_BASE_URL.to_string());
        let secure_base_url = lookup(SECURE_BASE_URL_ENV).unwrap_or_else(|| {
            if lookup(BASE_URL_ENV).is_some() {
                base_url.clone()
            } else {
                TMDB_SECURE_BASE_URL.to_string()
            }
        });

        let mut config = Self::new(api_key, &base_url)?.with_secure_base_url(&secure_base_url)?;
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Plain base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Secure base URL, without a trailing slash.
    pub fn secure_base_url(&self) -> &str {
        &self.secure_base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let parsed = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", parsed.scheme())));
    }
    if parsed.query().is_some() {
        return Err(invalid("base URL must not carry a query".to_string()));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
