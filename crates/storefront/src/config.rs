//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `KEYNEST_DATA_DIR` - Root directory for file storage (default: `.keynest`)
//! - `KEYNEST_ORIGIN` - Storage origin; each origin gets its own store (default: `localhost`)
//! - `KEYNEST_CATALOG_PATH` - JSON catalog file (default: `data/catalog.json`)
//! - `KEYNEST_TAX_RATE` - Checkout tax rate as a fraction (default: `0.10`)
//! - `KEYNEST_SESSION_TTL_HOURS` - Session token lifetime in hours (default: 24)
//! - `KEYNEST_RESET_DELAY_MS` - Simulated password reset latency (default: 1000)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use rust_decimal::Decimal;
use thiserror::Error;

const DEFAULT_DATA_DIR: &str = ".keynest";
const DEFAULT_ORIGIN: &str = "localhost";
const DEFAULT_CATALOG_PATH: &str = "data/catalog.json";
const DEFAULT_TAX_RATE: &str = "0.10";
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const DEFAULT_RESET_DELAY_MS: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Root directory for file-backed storage
    pub data_dir: PathBuf,
    /// Storage origin (one isolated store per origin)
    pub origin: String,
    /// Path to the JSON catalog
    pub catalog_path: PathBuf,
    /// Tax rate applied at checkout, as a fraction
    pub tax_rate: Decimal,
    /// Lifetime of issued session tokens
    pub session_ttl: TimeDelta,
    /// Simulated latency of the password reset request
    pub reset_delay: Duration,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            origin: DEFAULT_ORIGIN.to_string(),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            tax_rate: Decimal::new(10, 2),
            session_ttl: TimeDelta::hours(DEFAULT_SESSION_TTL_HOURS),
            reset_delay: Duration::from_millis(DEFAULT_RESET_DELAY_MS),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let tax_rate: Decimal = parse_var(
            "KEYNEST_TAX_RATE",
            &get("KEYNEST_TAX_RATE", DEFAULT_TAX_RATE),
        )?;
        if tax_rate.is_sign_negative() || tax_rate > Decimal::ONE {
            return Err(ConfigError::InvalidEnvVar(
                "KEYNEST_TAX_RATE".to_string(),
                format!("must be between 0 and 1 (got {tax_rate})"),
            ));
        }

        let ttl_hours: i64 = parse_var(
            "KEYNEST_SESSION_TTL_HOURS",
            &get("KEYNEST_SESSION_TTL_HOURS", &DEFAULT_SESSION_TTL_HOURS.to_string()),
        )?;
        let session_ttl = TimeDelta::try_hours(ttl_hours)
            .filter(|ttl| *ttl > TimeDelta::zero())
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "KEYNEST_SESSION_TTL_HOURS".to_string(),
                    format!("must be a positive number of hours (got {ttl_hours})"),
                )
            })?;

        let reset_delay_ms: u64 = parse_var(
            "KEYNEST_RESET_DELAY_MS",
            &get("KEYNEST_RESET_DELAY_MS", &DEFAULT_RESET_DELAY_MS.to_string()),
        )?;

        Ok(Self {
            data_dir: PathBuf::from(get("KEYNEST_DATA_DIR", DEFAULT_DATA_DIR)),
            origin: get("KEYNEST_ORIGIN", DEFAULT_ORIGIN),
            catalog_path: PathBuf::from(get("KEYNEST_CATALOG_PATH", DEFAULT_CATALOG_PATH)),
            tax_rate,
            session_ttl,
            reset_delay: Duration::from_millis(reset_delay_ms),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable's value, naming the variable on failure.
fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
