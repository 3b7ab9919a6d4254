use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub registry: RegistryConfig,
    pub logging: LoggingConfig,
}

/// Where the snapshot lives: blob backend, remote location and local staging file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Blob backend: `memory`, `filesystem` or `http`
    pub backend: String,
    /// Remote endpoint URL, or the root directory for the filesystem backend
    pub endpoint: String,
    /// Container/bucket holding the snapshot blob
    pub container: String,
    /// Local staging file mirrored to the blob store
    pub staging_path: PathBuf,
    /// Blob name; defaults to the staging file name
    pub blob_name: Option<String>,
    /// Pre-acquired bearer token for the http backend
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub lineage_match: LineageMatch,
}

/// How `create` picks the lineage record a new version follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineageMatch {
    /// First record in collection order sharing (datapoint, clause)
    #[default]
    FirstMatch,
    /// The lineage record currently marked latest, else the first match
    Latest,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "filesystem".to_string(),
            endpoint: ".".to_string(),
            container: "prompts".to_string(),
            staging_path: PathBuf::from("prompts.json"),
            blob_name: None,
            access_token: None,
            timeout_secs: 30,
        }
    }
}

impl StorageConfig {
    /// Path of the snapshot blob inside the container
    pub fn remote_path(&self) -> String {
        self.blob_name.clone().unwrap_or_else(|| {
            self.staging_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "prompts.json".to_string())
        })
    }

    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
