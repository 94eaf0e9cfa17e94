//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CC_STORE_BASE_URL` - Base URL of the store backend (e.g. `https://api.example.in`)
//!
//! ## Optional
//! - `CC_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `CC_TOAST_DURATION_MS` - Toast display time (default: 3000)
//! - `CC_TOAST_POSITION` - `top`, `middle` or `bottom` (default: bottom)
//! - `CC_TOAST_SHOW_CLOSE_BUTTON` - `true`/`false` (default: false)
//! - `CC_TOAST_CLOSE_BUTTON_TEXT` - Close button label (default: Ok)
//! - `PAYU_BEARER_TOKEN` - Payment gateway OAuth bearer token (enables online payment)
//! - `PAYU_MERCHANT_POS_ID` - Payment gateway point-of-sale id (enables online payment)
//! - `PAYU_BASE_URL` - Payment gateway base URL (default: <https://secure.snd.payu.com>)
//! - `PAYU_NOTIFY_URL` - Order status notification URL
//! - `PAYU_CURRENCY` - ISO 4217 currency code (default: INR)
//! - `PAYU_CUSTOMER_IP` - Customer IP reported to the gateway (default: 127.0.0.1)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::notify::{ToastPosition, ToastSettings};

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_PAYU_BASE_URL: &str = "https://secure.snd.payu.com";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Store backend base URL
    pub store_base_url: Url,
    /// Timeout applied to every backend request
    pub request_timeout: Duration,
    /// Toast presentation settings
    pub toast: ToastSettings,
    /// Online payment gateway; `None` disables the online path
    pub payu: Option<PayuConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Online payment gateway configuration.
///
/// Implements `Debug` manually to redact the bearer token.
#[derive(Clone)]
pub struct PayuConfig {
    /// Gateway base URL
    pub base_url: Url,
    /// OAuth bearer token
    pub bearer_token: SecretString,
    /// Merchant point-of-sale id
    pub merchant_pos_id: String,
    /// Order status notification URL
    pub notify_url: Option<String>,
    /// ISO 4217 currency code
    pub currency_code: String,
    /// Customer IP reported with each order
    pub customer_ip: String,
}

impl std::fmt::Debug for PayuConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayuConfig")
            .field("base_url", &self.base_url.as_str())
            .field("bearer_token", &"[REDACTED]")
            .field("merchant_pos_id", &self.merchant_pos_id)
            .field("notify_url", &self.notify_url)
            .field("currency_code", &self.currency_code)
            .field("customer_ip", &self.customer_ip)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the payment token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let store_base_url = parse_url("CC_STORE_BASE_URL", &get_required_env("CC_STORE_BASE_URL")?)?;
        let timeout_secs = get_env_or_default("CC_REQUEST_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CC_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            store_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            toast: toast_from_env()?,
            payu: PayuConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `store_base_url` with all defaults.
    #[must_use]
    pub fn for_store(store_base_url: Url) -> Self {
        Self {
            store_base_url,
            request_timeout: Duration::from_secs(30),
            toast: ToastSettings::default(),
            payu: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl PayuConfig {
    /// Online payment is only enabled when both the token and the POS id are set.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let (Some(_), Some(merchant_pos_id)) = (
            get_optional_env("PAYU_BEARER_TOKEN"),
            get_optional_env("PAYU_MERCHANT_POS_ID"),
        ) else {
            return Ok(None);
        };

        Ok(Some(Self {
            base_url: parse_url(
                "PAYU_BASE_URL",
                &get_env_or_default("PAYU_BASE_URL", DEFAULT_PAYU_BASE_URL),
            )?,
            bearer_token: get_validated_secret("PAYU_BEARER_TOKEN")?,
            merchant_pos_id,
            notify_url: get_optional_env("PAYU_NOTIFY_URL"),
            currency_code: get_env_or_default("PAYU_CURRENCY", "INR"),
            customer_ip: get_env_or_default("PAYU_CUSTOMER_IP", "127.0.0.1"),
        }))
    }
}

fn toast_from_env() -> Result<ToastSettings, ConfigError> {
    let duration_ms = get_env_or_default("CC_TOAST_DURATION_MS", "3000")
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("CC_TOAST_DURATION_MS".to_string(), e.to_string())
        })?;
    let position = get_env_or_default("CC_TOAST_POSITION", "bottom")
        .parse::<ToastPosition>()
        .map_err(|e| ConfigError::InvalidEnvVar("CC_TOAST_POSITION".to_string(), e))?;
    let show_close_button = get_env_or_default("CC_TOAST_SHOW_CLOSE_BUTTON", "false")
        .parse::<bool>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("CC_TOAST_SHOW_CLOSE_BUTTON".to_string(), e.to_string())
        })?;

    Ok(ToastSettings {
        duration: Duration::from_millis(duration_ms),
        show_close_button,
        close_button_text: get_env_or_default("CC_TOAST_CLOSE_BUTTON_TEXT", "Ok"),
        position,
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a base URL, normalising it to end with a slash so joins keep the path.
fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let normalised = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    };
    Url::parse(&normalised).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a real token."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_uuid_like_token_passes_strength_check() {
        assert!(validate_secret_strength("7f1c2b9e-4d83-4a6e-b5f0-2c9d81e6a3b4", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_placeholder_token_rejected() {
        let err = validate_secret_strength("your-payu-token", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_low_entropy_token_rejected() {
        assert!(validate_secret_strength("aaaaaaaaaaaaaaaaaaaa", "TEST_VAR").is_err());
    }

    #[test]
    fn test_parse_url_appends_slash() {
        let url = parse_url("TEST_URL", "https://api.example.in/v1").unwrap();
        assert_eq!(url.as_str(), "https://api.example.in/v1/");
        assert_eq!(
            url.join("store/getAddresses").unwrap().as_str(),
            "https://api.example.in/v1/store/getAddresses"
        );
    }

    #[test]
    fn test_parse_url_invalid() {
        assert!(matches!(
            parse_url("TEST_URL", "not a url"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_payu_config_debug_redacts_token() {
        let config = PayuConfig {
            base_url: Url::parse("https://secure.snd.payu.com/").unwrap(),
            bearer_token: SecretString::from("super_secret_bearer_token"),
            merchant_pos_id: "481905".to_string(),
            notify_url: None,
            currency_code: "INR".to_string(),
            customer_ip: "127.0.0.1".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("481905"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_bearer_token"));
    }

    #[test]
    fn test_for_store_defaults() {
        let config = ClientConfig::for_store(Url::parse("http://127.0.0.1:8080/").unwrap());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.payu.is_none());
        assert_eq!(config.toast.position, ToastPosition::Bottom);
    }
}
