//! FraudGuard Runtime - Rule catalog and execution for the FraudGuard rule engine
//!
//! This crate provides:
//! - the built-in fraud rules and the [`Rule`] trait they implement
//! - the [`RuleRegistry`] mapping rule types to definitions
//! - [`merge_rules`], which applies a program's overrides to the catalog
//! - the [`RuleExecutor`], which runs one rule against a raw context
//! - list lookups (disposable email domains) with memory, file and PostgreSQL backends

pub mod error;
pub mod executor;
pub mod lists;
pub mod merger;
pub mod registry;
pub mod rules;

// Re-export main types
pub use error::{Result, RuntimeError};
pub use executor::RuleExecutor;
pub use lists::{
    FileBackend, ListBackend, ListBackendType, ListConfig, ListLoader, ListService, ListsConfig,
    MemoryBackend, DISPOSABLE_EMAIL_DOMAINS,
};
pub use merger::{merge_rules, MergedRule};
pub use registry::{RuleRegistry, RuleRegistryBuilder};
pub use rules::{DynRule, NoConfig, Rule, RuleEnv, RuleMetadata, RuleOutcome};
