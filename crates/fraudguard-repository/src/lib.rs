//! Repository abstraction layer for FraudGuard
//!
//! The detection pipeline touches exactly three stores:
//!
//! - rule overrides per program (read only)
//! - fraud events (append only, single and batch insert)
//! - partner enrollments (read only, for the cross-program ban rule)
//!
//! # Backends
//!
//! - **Memory**: process-local maps for tests and demos
//! - **File System**: per-program override YAML files with TTL caching
//! - **PostgreSQL** (`postgres` feature): all three stores, cached override reads
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │        Fraud detector (sdk)            │
//! └──────────────┬─────────────────────────┘
//!                │ store traits
//!                ↓
//! ┌────────────────────────────────────────┐
//! │  OverrideRepository                    │
//! │  FraudEventRepository                  │
//! │  EnrollmentRepository                  │
//! └──────────────┬─────────────────────────┘
//!       ┌────────┼──────────────┐
//!       ↓        ↓              ↓
//!   Memory   FileSystem     PostgreSQL
//! ```

pub mod config;
pub mod error;
pub mod file_system;
pub mod memory;
pub mod models;
pub mod traits;

#[cfg(feature = "postgres")]
pub mod postgres;

// Re-exports - Configuration
pub use config::{ConfigError, RepositoryConfig, RepositorySource};

// Re-exports - Error
pub use error::{RepositoryError, RepositoryResult};

// Re-exports - Repositories
pub use file_system::FileSystemRepository;
pub use memory::MemoryRepository;
pub use models::{CacheConfig, CacheStats, EnrollmentStatus, ProgramEnrollment};
pub use traits::*;

#[cfg(feature = "postgres")]
pub use postgres::PostgresRepository;
