use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

use crate::ml::forecasting::ReorderPolicy;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const DEFAULT_FORECAST_PERIOD_DAYS: i64 = 30;
const DEFAULT_LOOKBACK_PERIOD_DAYS: i64 = 30;
const DEFAULT_LEAD_TIME_DAYS: i64 = 7;
const DEFAULT_SAFETY_STOCK_FACTOR: f64 = 1.5;
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 86_400; // daily

/// Forecasting policy configuration
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ForecastConfig {
    /// Forecast horizon used when the caller does not supply one
    #[serde(default = "default_forecast_period_days")]
    #[validate(range(min = 1, max = 3650))]
    pub default_forecast_period_days: i64,

    /// Historical window the daily sales rate is averaged over
    #[serde(default = "default_lookback_period_days")]
    #[validate(range(min = 1, max = 3650))]
    pub lookback_period_days: i64,

    /// Supplier lead time assumed by the reorder point
    #[serde(default = "default_lead_time_days")]
    #[validate(range(min = 1, max = 365))]
    pub lead_time_days: i64,

    /// Multiplier applied to lead-time demand to cover demand variance
    #[serde(default = "default_safety_stock_factor")]
    #[validate(range(min = 1.0, max = 10.0))]
    pub safety_stock_factor: f64,

    /// Run the recurring inventory check
    #[serde(default = "default_true_bool")]
    pub check_enabled: bool,

    /// Interval in seconds between inventory checks
    #[serde(default = "default_check_interval_secs")]
    #[validate(range(min = 60))]
    pub check_interval_secs: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            default_forecast_period_days: default_forecast_period_days(),
            lookback_period_days: default_lookback_period_days(),
            lead_time_days: default_lead_time_days(),
            safety_stock_factor: default_safety_stock_factor(),
            check_enabled: default_true_bool(),
            check_interval_secs: default_check_interval_secs(),
        }
    }
}

impl ForecastConfig {
    /// The reorder policy every forecast in this process is computed with
    pub fn reorder_policy(&self) -> ReorderPolicy {
        ReorderPolicy {
            lead_time_days: self.lead_time_days as f64,
            safety_stock_factor: self.safety_stock_factor,
        }
    }

    pub fn check_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.check_interval_secs)
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    #[validate(length(min = 1))]
    pub database_url: String,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Forecasting policy
    #[serde(default)]
    #[validate]
    pub forecast: ForecastConfig,
}

impl AppConfig {
    /// Creates a new configuration with default tuning
    pub fn new(database_url: String, environment: String) -> Self {
        Self {
            database_url,
            environment,
            log_level: default_log_level(),
            log_json: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            forecast: ForecastConfig::default(),
        }
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_db_max_connections() -> u32 {
    16
}
fn default_db_min_connections() -> u32 {
    2
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}

fn default_true_bool() -> bool {
    true
}

fn default_forecast_period_days() -> i64 {
    DEFAULT_FORECAST_PERIOD_DAYS
}

fn default_lookback_period_days() -> i64 {
    DEFAULT_LOOKBACK_PERIOD_DAYS
}

fn default_lead_time_days() -> i64 {
    DEFAULT_LEAD_TIME_DAYS
}

fn default_safety_stock_factor() -> f64 {
    DEFAULT_SAFETY_STOCK_FACTOR
}

fn default_check_interval_secs() -> u64 {
    DEFAULT_CHECK_INTERVAL_SECS
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("storefront_forecast={},sea_orm=warn", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*), e.g. `APP__FORECAST__LOOKBACK_PERIOD_DAYS=60`
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Same as [`load_config`] but reads files from `config_dir`
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://storefront.db?mode=rwc")?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::from(config_dir.join("default")).required(false))
        .add_source(File::from(config_dir.join(&run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}
