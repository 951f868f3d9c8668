//! CLI error types

use crate::config::ConfigError;
use crate::error::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

impl CliError {
    /// Message shown to the user, with hints where available
    pub fn user_message(&self) -> String {
        match self {
            CliError::Schema(error) => error.user_message(),
            CliError::FileReadError(path, reason) => {
                format!(
                    "Failed to read {}: {}\n\n\
                    Hint: Pass '-' to read the schema from stdin.",
                    path.display(),
                    reason
                )
            }
            _ => self.to_string(),
        }
    }
}
