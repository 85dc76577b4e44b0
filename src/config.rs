use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub inference: InferenceSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_max_upload_bytes() -> usize { 10 * 1024 * 1024 }

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceSettings {
    #[serde(default = "default_inference_endpoint")]
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_inference_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_model() -> String { "gpt-4o".to_string() }
fn default_max_tokens() -> u32 { 900 }
fn default_timeout_secs() -> u64 { 60 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub ttl_secs: Option<u64>,
    pub max_entries: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: Some(30),
            max_entries: Some(64),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    /// Store every parsed record in `breed_records` in addition to the stats upsert
    #[serde(default = "default_persist_records")]
    pub persist_records: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            persist_records: default_persist_records(),
        }
    }
}

fn default_persist_records() -> bool { true }

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

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with BREEDLENS_)
    /// 4. `DATABASE_URL` and `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            // e.g., BREEDLENS__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("BREEDLENS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_well_known_env(settings)?;

        settings.try_deserialize()
    }
}

/// Apply the conventional unprefixed variables on top of the layered config
fn apply_well_known_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }
    if let Ok(api_key) = env::var("OPENAI_API_KEY") {
        builder = builder.set_override("inference.api_key", api_key)?;
    }

    builder.build()
}
