//! Application configuration

mod app_config;

pub use app_config::{AppConfig, LineageMatch, LogFormat, LoggingConfig, RegistryConfig, StorageConfig};
