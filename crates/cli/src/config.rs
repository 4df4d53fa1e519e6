//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `TEY_CART_DIR` - Directory holding the cart records (default: .tey)
//! - `TEY_CART_KEY` - Key the cart is stored under (default: cartItems)
//! - `TEY_STOCK_POLICY` - `lenient` or `clamp` (default: lenient)
//! - `TEY_CURRENCY` - Display currency code (default: IDR)
//! - `TEY_LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::str::FromStr;

use tey_cart::{CartOptions, FileStore, StockPolicy};
use tey_core::CurrencyCode;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format {other:?} (expected text or json)")),
        }
    }
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory the file store is rooted at
    pub cart_dir: PathBuf,
    /// Key the cart is persisted under
    pub cart_key: String,
    /// Stock ceiling policy for `add`
    pub stock_policy: StockPolicy,
    /// Currency used when printing prices
    pub currency: CurrencyCode,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl CliConfig {
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
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let stock_policy = parse_var(
            "TEY_STOCK_POLICY",
            &get_or_default("TEY_STOCK_POLICY", "lenient"),
        )?;
        let currency = parse_var("TEY_CURRENCY", &get_or_default("TEY_CURRENCY", "IDR"))?;
        let log_format =
            parse_var("TEY_LOG_FORMAT", &get_or_default("TEY_LOG_FORMAT", "text"))?;

        let cart_key = get_or_default("TEY_CART_KEY", tey_cart::persistence::CART_KEY);
        FileStore::validate_key(&cart_key)
            .map_err(|e| ConfigError::InvalidEnvVar("TEY_CART_KEY".to_string(), e.to_string()))?;

        Ok(Self {
            cart_dir: PathBuf::from(get_or_default("TEY_CART_DIR", ".tey")),
            cart_key,
            stock_policy,
            currency,
            log_format,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
        })
    }

    /// Store options derived from this configuration.
    #[must_use]
    pub fn cart_options(&self) -> CartOptions {
        CartOptions {
            cart_key: self.cart_key.clone(),
            stock_policy: self.stock_policy,
            ..CartOptions::default()
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable's value, naming the variable on failure.
fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    value
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CliConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.cart_dir, PathBuf::from(".tey"));
        assert_eq!(config.cart_key, "cartItems");
        assert_eq!(config.stock_policy, StockPolicy::Lenient);
        assert_eq!(config.currency, CurrencyCode::IDR);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TEY_CART_DIR", "/var/lib/tey"),
            ("TEY_CART_KEY", "guestCart"),
            ("TEY_STOCK_POLICY", "clamp"),
            ("TEY_CURRENCY", "usd"),
            ("TEY_LOG_FORMAT", "json"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ])
        .unwrap();
        assert_eq!(config.cart_dir, PathBuf::from("/var/lib/tey"));
        assert_eq!(config.stock_policy, StockPolicy::Clamp);
        assert_eq!(config.currency, CurrencyCode::USD);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.sentry_dsn.is_some());

        let options = config.cart_options();
        assert_eq!(options.cart_key, "guestCart");
        assert_eq!(options.stock_policy, StockPolicy::Clamp);
        assert_eq!(options.checkout_key, "coItems");
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = load(&[("TEY_STOCK_POLICY", "strict")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "TEY_STOCK_POLICY"));

        let err = load(&[("TEY_CURRENCY", "XYZ")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "TEY_CURRENCY"));

        let err = load(&[("TEY_CART_KEY", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "TEY_CART_KEY"));
    }

    #[test]
    fn test_cart_key_must_name_a_file() {
        for key in ["a/b", "../cart", ".hidden", "cart items"] {
            let err = load(&[("TEY_CART_KEY", key)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidEnvVar(ref var, _) if var == "TEY_CART_KEY"),
                "key {key:?} should be rejected"
            );
        }
        assert_eq!(load(&[("TEY_CART_KEY", "guest-cart.v2")]).unwrap().cart_key, "guest-cart.v2");
    }

    #[test]
    fn test_empty_sentry_dsn_is_ignored() {
        let config = load(&[("SENTRY_DSN", "")]).unwrap();
        assert!(config.sentry_dsn.is_none());
    }
}
