//! Unit tests for RepositoryError types and error handling

use fraudguard_core::CoreError;
use fraudguard_repository::RepositoryError;
use std::path::PathBuf;

#[test]
fn test_error_not_found_display() {
    let error = RepositoryError::NotFound("fre_123".to_string());
    assert_eq!(error.to_string(), "Record not found: fre_123");
}

#[test]
fn test_error_duplicate_override_display() {
    let error = RepositoryError::DuplicateOverride {
        program_id: "prog_1".to_string(),
        rule_type: "self_referral".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Duplicate override for program 'prog_1' and rule 'self_referral'"
    );
}

#[test]
fn test_error_invalid_path_display() {
    let error = RepositoryError::InvalidPath {
        path: PathBuf::from("/invalid/path"),
    };
    assert_eq!(error.to_string(), "Invalid path: /invalid/path");
}

#[test]
fn test_error_from_core_error() {
    let error: RepositoryError = CoreError::UnknownRuleType("mystery".to_string()).into();
    assert!(matches!(error, RepositoryError::InvalidRecord(_)));
    assert!(error.to_string().contains("mystery"));
}

#[test]
fn test_error_io_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let repo_error: RepositoryError = io_error.into();
    assert!(repo_error.to_string().contains("I/O error"));
}
