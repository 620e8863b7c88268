use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub transport: TransportSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransportSettings {
    #[serde(default = "default_websocket_url")]
    pub websocket_url: String,
    #[serde(default = "default_true")]
    pub enable_real_time_alerts: bool,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            websocket_url: default_websocket_url(),
            enable_real_time_alerts: true,
            base_delay_ms: default_base_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_skills_weight")]
    pub skills: f64,
    #[serde(default = "default_budget_weight")]
    pub budget: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_recency_weight")]
    pub recency: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            skills: default_skills_weight(),
            budget: default_budget_weight(),
            location: default_location_weight(),
            recency: default_recency_weight(),
        }
    }
}

impl From<WeightsConfig> for crate::models::ScoringWeights {
    fn from(config: WeightsConfig) -> Self {
        Self {
            skills: config.skills,
            budget: config.budget,
            location: config.location,
            recency: config.recency,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_api_base_url() -> String { "https://api.gigflow.app".to_string() }
fn default_request_timeout_secs() -> u64 { 10 }
fn default_websocket_url() -> String { "wss://ws.gigflow.app".to_string() }
fn default_true() -> bool { true }
fn default_base_delay_ms() -> u64 { 1000 }
fn default_max_reconnect_attempts() -> u32 { 5 }
fn default_cache_ttl_secs() -> u64 { 300 }
fn default_skills_weight() -> f64 { 0.6 }
fn default_budget_weight() -> f64 { 0.2 }
fn default_location_weight() -> f64 { 0.1 }
fn default_recency_weight() -> f64 { 0.1 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with GIGFLOW_)
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        dotenv::dotenv().ok();

        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., GIGFLOW_TRANSPORT__WEBSOCKET_URL -> transport.websocket_url
            .add_source(
                Environment::with_prefix("GIGFLOW")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("GIGFLOW")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Remote request timeout as a Duration
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.catalog.request_timeout_secs)
    }

    /// Cache TTL as a Duration
    pub fn cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cache.ttl_secs)
    }

    /// Reconnect base delay as a Duration
    pub fn reconnect_base_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.transport.base_delay_ms)
    }
}
