use crate::core::engine::{EngineOptions, DEFAULT_PARALLEL_THRESHOLD};
use crate::models::Campus;
use crate::services::dataset::{CleaningRules, DEFAULT_MAX_DRIVING_DISTANCE};
use crate::services::directions::DEFAULT_DIRECTIONS_ENDPOINT;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub dataset: DatasetSettings,
    #[serde(default)]
    pub directions: DirectionsSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub recommend: RecommendSettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub crime: CrimeSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetSettings {
    pub path: String,
    #[serde(default = "default_reference_campus", deserialize_with = "deserialize_campus")]
    pub reference_campus: Campus,
    #[serde(default = "default_max_driving_distance")]
    pub max_driving_distance: f64,
}

impl DatasetSettings {
    pub fn cleaning_rules(&self) -> CleaningRules {
        CleaningRules {
            reference_campus: self.reference_campus,
            max_driving_distance: self.max_driving_distance,
        }
    }
}

fn default_reference_campus() -> Campus { Campus::NortheasternUniversity }

/// Accepts either the display name or the snake_case slug
fn deserialize_campus<'de, D>(deserializer: D) -> Result<Campus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

fn default_max_driving_distance() -> f64 { DEFAULT_MAX_DRIVING_DISTANCE }

#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsSettings {
    #[serde(default = "default_directions_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

impl Default for DirectionsSettings {
    fn default() -> Self {
        Self {
            endpoint: default_directions_endpoint(),
            api_key: String::new(),
            timeout_secs: None,
        }
    }
}

fn default_directions_endpoint() -> String { DEFAULT_DIRECTIONS_ENDPOINT.to_string() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> u16 { 10 }
fn default_max_limit() -> u16 { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

impl EngineSettings {
    pub fn options(&self) -> EngineOptions {
        EngineOptions {
            parallel_threshold: self.parallel_threshold,
        }
    }
}

fn default_parallel_threshold() -> usize { DEFAULT_PARALLEL_THRESHOLD }

/// Crime estimates for the current residence when a request carries none
#[derive(Debug, Clone, Deserialize)]
pub struct CrimeSettings {
    #[serde(default = "default_violent_crime")]
    pub default_violent: f64,
    #[serde(default = "default_overall_crime")]
    pub default_overall: f64,
}

impl Default for CrimeSettings {
    fn default() -> Self {
        Self {
            default_violent: default_violent_crime(),
            default_overall: default_overall_crime(),
        }
    }
}

fn default_violent_crime() -> f64 { 0.3 }
fn default_overall_crime() -> f64 { 2.0 }

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

impl LoggingSettings {
    /// Apply `LOG_LEVEL` / `LOG_FORMAT` style overrides on top of the configured values
    pub fn with_overrides(self, level: Option<String>, format: Option<String>) -> Self {
        Self {
            level: level.filter(|l| !l.trim().is_empty()).unwrap_or(self.level),
            format: format.filter(|f| !f.trim().is_empty()).unwrap_or(self.format),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with RENTROBO__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., RENTROBO__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("RENTROBO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("RENTROBO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }
}

/// Apply well-known environment variables that are not namespaced
///
/// `GOOGLE_MAPS_API_KEY` sets the directions key and `LISTINGS_CSV` the
/// dataset path.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(api_key) = env::var("GOOGLE_MAPS_API_KEY") {
        builder = builder.set_override("directions.api_key", api_key)?;
    }
    if let Ok(path) = env::var("LISTINGS_CSV") {
        builder = builder.set_override("dataset.path", path)?;
    }

    builder.build()
}
