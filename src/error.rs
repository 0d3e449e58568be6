use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProvisionError>;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("You are missing a dockstore config file")]
    MissingConfiguration,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Home directory not found")]
    HomeDirectoryNotFound,

    #[error("Could not execute command: {command}: {source}")]
    ProcessLaunchFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command got interrupted: {command}: {message}")]
    ProcessInterrupted { command: String, message: String },

    #[error("Command timed out after {timeout:?}: {command}")]
    ProcessTimedOut { command: String, timeout: Duration },

    #[error("icgc-get reported an error: {stderr}")]
    ExternalToolReportedError { stderr: String },

    #[error("File system error at {path}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ICGC Get does not support {operation}")]
    UnsupportedOperation { operation: String },
}

impl ProvisionError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        ProvisionError::ConfigError {
            message: message.into(),
        }
    }

    pub fn file_system<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        ProvisionError::FileSystem {
            path: path.into(),
            source,
        }
    }

    pub fn unsupported<S: Into<String>>(operation: S) -> Self {
        ProvisionError::UnsupportedOperation {
            operation: operation.into(),
        }
    }
}
