//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating `ReconcilerConfig`
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },

    /// A setting the command cannot run without, such as the database URL
    #[error("Missing required setting: {0}")]
    MissingField(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let err = ConfigError::Validation {
            field: "worker.batch_size".to_string(),
            message: "batch size must be non-zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for 'worker.batch_size': batch size must be non-zero"
        );
    }

    #[test]
    fn test_missing_field_message() {
        let err = ConfigError::MissingField("store.database_url".to_string());
        assert!(err.to_string().contains("store.database_url"));
    }
}
