//! Error types for FraudGuard Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Unknown rule type: {0}")]
    UnknownRuleType(String),

    #[error("Invalid risk policy: {0}")]
    InvalidPolicy(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
