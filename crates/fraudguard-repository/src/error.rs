//! Error types for the repository layer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur during repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A second override for the same program and rule type
    #[error("Duplicate override for program '{program_id}' and rule '{rule_type}'")]
    DuplicateOverride {
        program_id: String,
        rule_type: String,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid path provided
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// Stored value could not be mapped onto a domain type
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Database error (when database feature is enabled)
    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store does not support the operation
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Generic error
    #[error("Repository error: {0}")]
    Other(String),
}

impl From<fraudguard_core::CoreError> for RepositoryError {
    fn from(err: fraudguard_core::CoreError) -> Self {
        RepositoryError::InvalidRecord(err.to_string())
    }
}
