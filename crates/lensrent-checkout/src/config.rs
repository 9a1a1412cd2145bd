//! # Checkout Configuration
//!
//! Loaded once at startup and read-only afterwards.
//!
//! ## Environment Variables
//! | Variable                   | Default       | Notes                    |
//! |----------------------------|---------------|--------------------------|
//! | `LENSRENT_DATABASE_PATH`   | `lensrent.db` | SQLite file              |
//! | `LENSRENT_CURRENCY_SYMBOL` | `₹`           | Display only             |
//! | `LENSRENT_MAX_RENT_DAYS`   | `30`          | Must be within 1..=365   |
//! | `LENSRENT_UPI_ENABLED`     | `true`        | `false` leaves COD only  |

use std::env;
use std::path::PathBuf;

use lensrent_core::{Money, PaymentMethod, AVAILABILITY_HORIZON_DAYS, MAX_RENT_DAYS};
use lensrent_db::DbConfig;
use serde::{Deserialize, Serialize};

/// Storefront configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Longest camera rental accepted at checkout, in inclusive days
    pub max_rent_days: i64,

    /// Whether UPI is offered alongside cash on delivery
    pub upi_enabled: bool,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        CheckoutConfig {
            database_path: PathBuf::from("lensrent.db"),
            currency_symbol: "₹".to_string(),
            max_rent_days: MAX_RENT_DAYS,
            upi_enabled: true,
        }
    }
}

impl CheckoutConfig {
    /// Loads configuration from `LENSRENT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CheckoutConfig::default();

        let config = CheckoutConfig {
            database_path: lookup("LENSRENT_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            currency_symbol: lookup("LENSRENT_CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol),

            max_rent_days: match lookup("LENSRENT_MAX_RENT_DAYS") {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("LENSRENT_MAX_RENT_DAYS".to_string()))?,
                None => defaults.max_rent_days,
            },

            upi_enabled: match lookup("LENSRENT_UPI_ENABLED") {
                Some(raw) => parse_bool(&raw)
                    .ok_or_else(|| ConfigError::InvalidValue("LENSRENT_UPI_ENABLED".to_string()))?,
                None => defaults.upi_enabled,
            },
        };

        if !(1..=AVAILABILITY_HORIZON_DAYS).contains(&config.max_rent_days) {
            return Err(ConfigError::InvalidValue("LENSRENT_MAX_RENT_DAYS".to_string()));
        }

        Ok(config)
    }

    /// Database settings for this storefront.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
    }

    /// Payment methods offered at checkout.
    pub fn payment_methods(&self) -> Vec<PaymentMethod> {
        let mut methods = vec![PaymentMethod::CashOnDelivery];
        if self.upi_enabled {
            methods.push(PaymentMethod::Upi);
        }
        methods
    }

    /// Formats an amount with the configured symbol, e.g. `₹1500.00`.
    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with(&self.currency_symbol)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
