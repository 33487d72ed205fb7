//! SDK error types

use thiserror::Error;

/// SDK error type
///
/// Only construction and configuration surface these; the detection entry
/// points log failures and return `None` instead.
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid risk policy or other core validation failure
    #[error("Invalid value: {0}")]
    CoreError(#[from] fraudguard_core::CoreError),

    /// Runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] fraudguard_runtime::RuntimeError),

    /// Store error
    #[error("Repository error: {0}")]
    RepositoryError(#[from] fraudguard_repository::RepositoryError),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
