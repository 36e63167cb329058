use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub inference: InferenceSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub examples: ExamplesSettings,
    #[serde(default)]
    pub cache: CacheSettings,
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
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    /// Upsert the examples file into the `images` table at startup
    #[serde(default)]
    pub seed_from_examples: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceSettings {
    pub endpoint: String,
    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    /// Largest `radius_km` the HTTP endpoints accept
    #[serde(default = "default_max_radius_km")]
    pub max_radius_km: f64,
    #[serde(default = "default_max_top_k")]
    pub max_top_k: u16,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_radius_km: default_max_radius_km(),
            max_top_k: default_max_top_k(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExamplesSettings {
    #[serde(default = "default_examples_path")]
    pub path: String,
    /// Grid cell size for the in-memory index; unset means a plain linear scan
    pub grid_cell_degrees: Option<f64>,
}

impl Default for ExamplesSettings {
    fn default() -> Self {
        Self {
            path: default_examples_path(),
            grid_cell_degrees: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
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

fn default_inference_timeout() -> u64 { 30 }
fn default_max_radius_km() -> f64 { 10_000.0 }
fn default_max_top_k() -> u16 { 10 }
fn default_examples_path() -> String { "data/examples.json".to_string() }
fn default_cache_ttl() -> u64 { 60 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with GEOCLIP__, sections split by __)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., GEOCLIP__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("GEOCLIP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("GEOCLIP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Honour the conventional unprefixed variables used by the deployment
///
/// `DATABASE_URL` sets `database.url` and `INFERENCE_URL` sets
/// `inference.endpoint` when present.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(endpoint) = env::var("INFERENCE_URL") {
        builder = builder.set_override("inference.endpoint", endpoint)?;
    }

    builder.build()
}
