//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `VITRINA_DATA_DIR` - Directory for persisted documents (default: `.vitrina`,
//!   `none` disables persistence)
//! - `VITRINA_SEED_DIR` - Directory holding the first-run seed files
//!   (default: `crates/storefront/seed`)
//! - `VITRINA_ORDER_PREFIX` - Prefix of generated order ids (default: `ORD`)
//! - `VITRINA_LOW_STOCK_THRESHOLD` - Stock level that triggers a low-stock
//!   warning after an order (default: 5)
//! - `VITRINA_BACKEND_URL` - Backend base URL; backend calls are skipped when unset
//! - `VITRINA_BACKEND_TOKEN` - Bearer token sent to the backend
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DISABLED_DATA_DIR: &str = "none";
const MAX_ORDER_PREFIX_LENGTH: usize = 12;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Where documents are persisted; `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    /// Where seed files are read from
    pub seed_dir: PathBuf,
    /// Prefix of generated order ids
    pub order_prefix: String,
    /// Stock at or below this level is reported after an order
    pub low_stock_threshold: u32,
    /// Backend API configuration
    pub backend: Option<BackendConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: Some(PathBuf::from(".vitrina")),
            seed_dir: PathBuf::from("crates/storefront/seed"),
            order_prefix: "ORD".to_string(),
            low_stock_threshold: 5,
            backend: None,
            sentry_dsn: None,
        }
    }
}

/// Backend API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL, always ending in `/`
    pub base_url: Url,
    /// Bearer token
    pub token: Option<SecretString>,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = parse_data_dir(&get_env_or_default("VITRINA_DATA_DIR", ".vitrina"));
        let seed_dir = PathBuf::from(get_env_or_default(
            "VITRINA_SEED_DIR",
            "crates/storefront/seed",
        ));
        let order_prefix = parse_order_prefix(
            "VITRINA_ORDER_PREFIX",
            &get_env_or_default("VITRINA_ORDER_PREFIX", "ORD"),
        )?;
        let low_stock_threshold = get_env_or_default("VITRINA_LOW_STOCK_THRESHOLD", "5")
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("VITRINA_LOW_STOCK_THRESHOLD".to_string(), e.to_string())
            })?;
        let backend = BackendConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            data_dir,
            seed_dir,
            order_prefix,
            low_stock_threshold,
            backend,
            sentry_dsn,
        })
    }
}

impl BackendConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let token = get_optional_env("VITRINA_BACKEND_TOKEN").map(SecretString::from);
        if token.is_none() && get_optional_env("VITRINA_BACKEND_URL").is_none() {
            return Ok(None);
        }
        // A token is useless without somewhere to send it.
        let raw = get_required_env("VITRINA_BACKEND_URL")?;
        let base_url = parse_base_url("VITRINA_BACKEND_URL", &raw)?;
        Ok(Some(Self { base_url, token }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_data_dir(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    if value.eq_ignore_ascii_case(DISABLED_DATA_DIR) {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

/// Order prefixes are short uppercase alphanumeric words.
fn parse_order_prefix(var_name: &str, value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    let valid = !value.is_empty()
        && value.len() <= MAX_ORDER_PREFIX_LENGTH
        && value
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if !valid {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!(
                "must be 1-{MAX_ORDER_PREFIX_LENGTH} uppercase letters or digits (got '{value}')"
            ),
        ));
    }
    Ok(value.to_string())
}

/// Parse an http(s) base URL and make sure it ends in `/` so routes join
/// under it rather than replacing its last segment.
fn parse_base_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_none_disables_persistence() {
        assert_eq!(parse_data_dir("none"), None);
        assert_eq!(parse_data_dir(" NONE "), None);
        assert_eq!(parse_data_dir("/var/lib/vitrina"), Some(PathBuf::from("/var/lib/vitrina")));
    }

    #[test]
    fn test_order_prefix_valid() {
        assert_eq!(parse_order_prefix("TEST_VAR", "ORD").unwrap(), "ORD");
        assert_eq!(parse_order_prefix("TEST_VAR", " VT2 ").unwrap(), "VT2");
    }

    #[test]
    fn test_order_prefix_rejects_lowercase_and_symbols() {
        for bad in ["ord", "OR-D", "", "ABCDEFGHIJKLMN"] {
            let err = parse_order_prefix("TEST_VAR", bad).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)), "{bad}");
        }
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base_url("TEST_VAR", "https://api.example.com/shop").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/shop/");
        assert_eq!(
            url.join("api/orders").unwrap().as_str(),
            "https://api.example.com/shop/api/orders"
        );
    }

    #[test]
    fn test_base_url_rejects_other_schemes() {
        assert!(parse_base_url("TEST_VAR", "ftp://example.com").is_err());
        assert!(parse_base_url("TEST_VAR", "not a url").is_err());
    }

    #[test]
    fn test_backend_config_debug_redacts_token() {
        let config = BackendConfig {
            base_url: Url::parse("https://api.example.com/").unwrap(),
            token: Some(SecretString::from("super-secret-token")),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-token"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("TEST_VAR".to_string());
        assert_eq!(err.to_string(), "Missing environment variable: TEST_VAR");

        let err = ConfigError::InvalidEnvVar("TEST_VAR".to_string(), "bad value".to_string());
        assert_eq!(err.to_string(), "Invalid environment variable TEST_VAR: bad value");
    }
}
