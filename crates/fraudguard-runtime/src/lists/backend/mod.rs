//! List backend implementations
//!
//! Backends for storing and querying list data.

pub mod file;
mod memory;
#[cfg(feature = "sqlx")]
pub mod postgresql;

pub use file::FileBackend;
pub use memory::MemoryBackend;
#[cfg(feature = "sqlx")]
pub use postgresql::PostgresBackend;

use crate::error::Result;

/// Canonical form of a list entry.
///
/// Entries are matched case-insensitively: every backend stores and looks up
/// values in this form.
pub fn normalize_entry(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Trait for list storage backends
#[async_trait::async_trait]
pub trait ListBackend: Send + Sync {
    /// Check if a value exists in the list
    async fn contains(&self, list_id: &str, value: &str) -> Result<bool>;

    /// Add a value to the list
    async fn add(&self, list_id: &str, value: String) -> Result<()>;

    /// Remove a value from the list
    async fn remove(&self, list_id: &str, value: &str) -> Result<()>;

    /// Get all values in a list
    async fn get_all(&self, list_id: &str) -> Result<Vec<String>>;
}
