use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

use crate::db::StoreError;
use crate::probe::ProbeError;
use crate::secrets::SecretError;

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to render report: {0}")]
    Render(#[from] serde_json::Error),

    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),
}

impl DoctorError {
    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            DoctorError::Config(_) => ExitCode::from(2),
            DoctorError::Store(_) => ExitCode::from(3),
            DoctorError::Render(_) | DoctorError::Probe(_) => ExitCode::FAILURE,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required settings: {}", .names.join(", "))]
    MissingSettings { names: Vec<String> },

    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid database credential: {0}")]
    Secret(#[from] SecretError),

    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, DoctorError>;
