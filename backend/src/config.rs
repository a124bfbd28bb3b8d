//! Configuration management for the Ziel Analytics backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with ZIEL_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Dataset snapshot storage configuration
    pub storage: StorageConfig,

    /// Access control configuration
    pub auth: AuthConfig,

    /// Default analytics parameters
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding dataset JSON snapshots
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// User id granted the admin role (dataset uploads)
    pub admin_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsConfig {
    /// Number of RFM quantile buckets
    pub rfm_buckets: u32,

    /// Trailing window (months) for the moving-average forecast
    pub moving_average_window: usize,

    /// Trailing window (days) for sales-velocity calculations
    pub velocity_window_days: i64,

    /// Available-quantity floor that marks an item as low stock
    pub low_stock_threshold: i64,

    /// Available-quantity floor below which an item is never overstocked
    pub overstock_threshold: i64,

    /// Units per day above which demand counts as high
    pub velocity_threshold: i64,

    /// Days of velocity cover beyond which stock counts as excess
    pub overstock_multiplier: i64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("ZIEL_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("storage.data_dir", "data")?
            .set_default("auth.admin_id", "admin")?
            .set_default("analytics.rfm_buckets", 5)?
            .set_default("analytics.moving_average_window", 3)?
            .set_default("analytics.velocity_window_days", 30)?
            .set_default("analytics.low_stock_threshold", 5)?
            .set_default("analytics.overstock_threshold", 100)?
            .set_default("analytics.velocity_threshold", 1)?
            .set_default("analytics.overstock_multiplier", 30)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (ZIEL_ prefix)
            .add_source(
                Environment::with_prefix("ZIEL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
