//! Configuration management for the Farm Weather service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FW_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{FarmSettings, Units};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Document store configuration
    pub store: StoreConfig,

    /// Weather provider configuration
    pub weather: WeatherConfig,

    /// Farm settings used until the user stores their own
    pub farm: FarmDefaults,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// Which document store implementation to run against
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// PostgreSQL connection URL, required for the postgres backend
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Collection holding weather records
    pub weather_collection: String,

    /// Collection holding the farm settings document
    pub settings_collection: String,

    /// Fixed id of the farm settings document
    pub settings_document_id: String,

    /// Collection of curated recommendations; unset disables the lookup
    pub recommendations_collection: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Weather API endpoint
    pub api_endpoint: String,

    /// Weather API key
    pub api_key: String,

    /// HTTP timeout for provider requests, in seconds
    pub timeout_secs: u64,

    /// Let concurrent update requests share one in-flight cycle
    pub single_flight: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FarmDefaults {
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub units: Units,
    pub update_frequency: u32,
    pub extreme_weather_alerts: bool,
    pub daily_report: bool,
}

impl FarmDefaults {
    pub fn to_settings(&self) -> FarmSettings {
        FarmSettings {
            units: self.units,
            update_frequency: self.update_frequency,
            farm_latitude: self.latitude,
            farm_longitude: self.longitude,
            extreme_weather_alerts: self.extreme_weather_alerts,
            daily_report: self.daily_report,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("FW_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("store.backend", "postgres")?
            .set_default("store.max_connections", 10)?
            .set_default("store.min_connections", 2)?
            .set_default("store.weather_collection", "weather_data")?
            .set_default("store.settings_collection", "farm_settings")?
            .set_default("store.settings_document_id", "farm_settings")?
            .set_default("store.recommendations_collection", "weather_recommendations")?
            .set_default("weather.api_endpoint", "https://api.openweathermap.org/data/2.5")?
            .set_default("weather.api_key", "")?
            .set_default("weather.timeout_secs", 10)?
            .set_default("weather.single_flight", true)?
            .set_default("farm.latitude", "41.1579")?
            .set_default("farm.longitude", "-8.6291")?
            .set_default("farm.units", "metric")?
            .set_default("farm.update_frequency", 30)?
            .set_default("farm.extreme_weather_alerts", false)?
            .set_default("farm.daily_report", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FW_ prefix)
            .add_source(
                Environment::with_prefix("FW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Configuration for tests and local runs: in-memory store, no API key
    pub fn for_memory_store() -> Self {
        let farm = FarmSettings::default();
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            store: StoreConfig {
                backend: StoreBackend::Memory,
                url: None,
                max_connections: 1,
                min_connections: 0,
                weather_collection: "weather_data".to_string(),
                settings_collection: "farm_settings".to_string(),
                settings_document_id: "farm_settings".to_string(),
                recommendations_collection: Some("weather_recommendations".to_string()),
            },
            weather: WeatherConfig {
                api_endpoint: "https://api.openweathermap.org/data/2.5".to_string(),
                api_key: String::new(),
                timeout_secs: 10,
                single_flight: true,
            },
            farm: FarmDefaults {
                latitude: farm.farm_latitude,
                longitude: farm.farm_longitude,
                units: farm.units,
                update_frequency: farm.update_frequency,
                extreme_weather_alerts: farm.extreme_weather_alerts,
                daily_report: farm.daily_report,
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
        }
    }
}
