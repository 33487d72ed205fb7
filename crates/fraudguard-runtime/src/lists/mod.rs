//! List management module
//!
//! Set-membership lookups used by the rules, most importantly the shared
//! disposable email domain set.

pub mod backend;
pub mod config;
pub mod service;

pub use backend::{FileBackend, ListBackend, MemoryBackend};
#[cfg(feature = "sqlx")]
pub use backend::PostgresBackend;
pub use config::{ListBackendType, ListConfig, ListLoader, ListsConfig};
pub use service::ListService;

/// Key of the shared disposable email domain set
pub const DISPOSABLE_EMAIL_DOMAINS: &str = "disposableEmailDomains";
