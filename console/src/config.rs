//! Configuration management for the Facility Ops Console
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with FOPS_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// REST API configuration
    pub api: ApiConfig,

    /// Where records are persisted
    pub storage: StorageConfig,

    /// List and dropdown sizing
    pub ui: UiConfig,

    /// Log output configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the REST API, e.g. https://ops.example.com/api
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Bearer token sent with every request
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Talk to the REST API
    Remote,
    /// Keep records in the embedded key-value store
    Local,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub mode: StorageMode,

    /// JSON snapshot the local store is loaded from and saved to
    pub snapshot_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    /// Rows per page in list tables
    pub page_size: u32,

    /// Rows requested per dropdown category
    pub dropdown_page_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is unset
    pub filter: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("FOPS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("api.base_url", "http://localhost:8000/api")?
            .set_default("api.timeout_secs", 30)?
            .set_default("storage.mode", "remote")?
            .set_default("ui.page_size", 10)?
            .set_default("ui.dropdown_page_size", 1000)?
            .set_default("logging.filter", "facility_ops_console=debug,reqwest=warn")?
            .set_default("logging.json", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FOPS_ prefix)
            .add_source(
                Environment::with_prefix("FOPS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            dropdown_page_size: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "facility_ops_console=debug,reqwest=warn".to_string(),
            json: false,
        }
    }
}
