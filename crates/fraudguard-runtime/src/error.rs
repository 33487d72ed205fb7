//! Runtime error types

use fraudguard_repository::RepositoryError;
use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Rule type absent from the registry, or a reserved slot without an implementation
    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    /// Context does not match the shape the rule requires
    #[error("Invalid context for rule '{rule}': {reason}")]
    InvalidContext { rule: String, reason: String },

    /// Rule configuration failed to parse or validate
    #[error("Invalid config for rule '{rule}': {reason}")]
    InvalidConfig { rule: String, reason: String },

    /// External lookup failed
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// Operation exceeded its time budget
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Store error
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Rule evaluation failed
    #[error("Evaluation failed: {0}")]
    Evaluation(String),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
