//! Error types for the config module.

use std::path::PathBuf;

use customazed_template::TemplateError;
use thiserror::Error;

/// Result type alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or resolving a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid config format in {path}: {message}")]
    InvalidFormat { path: String, message: String },

    #[error("Config {path}: {source}")]
    Resolve {
        path: String,
        #[source]
        source: TemplateError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
