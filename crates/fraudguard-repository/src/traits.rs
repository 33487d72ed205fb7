//! Store boundaries used by the detection pipeline
//!
//! - [`OverrideRepository`]: read program-level rule overrides
//! - [`FraudEventRepository`]: append evaluation results
//! - [`EnrollmentRepository`]: partner enrollment lookups for cross-program checks
//! - [`CacheableRepository`]: cache management for stores that cache reads
//!
//! # Examples
//!
//! ```no_run
//! use fraudguard_repository::{MemoryRepository, OverrideRepository};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let repo = MemoryRepository::new();
//! let overrides = repo.list_overrides("prog_123").await?;
//! assert!(overrides.is_empty());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use fraudguard_core::{FraudEvent, FraudRuleOverride, NewFraudEvent};

use crate::{CacheStats, RepositoryResult};

/// Read access to per-program rule overrides
///
/// The detection pipeline never writes overrides; program admins manage
/// them elsewhere.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait OverrideRepository: Send + Sync {
    /// All overrides for a program, in any order.
    /// An unknown program yields an empty list, not an error.
    async fn list_overrides(&self, program_id: &str) -> RepositoryResult<Vec<FraudRuleOverride>>;
}

/// Write access to fraud events
#[async_trait]
pub trait FraudEventRepository: Send + Sync {
    /// Insert one event carrying the full triggered-rule list
    async fn create_fraud_event(&self, record: NewFraudEvent) -> RepositoryResult<FraudEvent>;

    /// Insert several events in one call, returning how many were written
    async fn create_fraud_events(&self, records: Vec<NewFraudEvent>) -> RepositoryResult<u64>;

    /// Events recorded for a program, oldest first
    async fn list_fraud_events(&self, program_id: &str) -> RepositoryResult<Vec<FraudEvent>>;
}

/// Partner enrollment lookups
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Ids of programs, other than `exclude_program_id`, in which the partner is banned
    async fn banned_program_ids(
        &self,
        partner_id: &str,
        exclude_program_id: &str,
    ) -> RepositoryResult<Vec<String>>;
}

/// Extension trait for repositories with caching support
pub trait CacheableRepository: Send + Sync {
    /// Get cache statistics
    fn cache_stats(&self) -> CacheStats;

    /// Drop every cached entry
    fn clear_cache(&self);

    /// Drop the cached overrides of one program
    fn invalidate(&self, program_id: &str);
}
