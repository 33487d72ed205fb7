//! Repository configuration types
//!
//! Selects where rule overrides are read from and where fraud events are written.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::CacheConfig;

/// Repository source type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositorySource {
    /// Process-local maps (tests, demos)
    #[default]
    Memory,
    /// Override YAML files on disk; events stay in memory
    FileSystem,
    /// PostgreSQL for overrides, events and enrollments
    Database,
}

/// Repository configuration
///
/// # Examples
///
/// ```rust
/// use fraudguard_repository::RepositoryConfig;
///
/// let config = RepositoryConfig::memory();
/// let config = RepositoryConfig::file_system("repository");
/// let config = RepositoryConfig::database("postgresql://localhost/fraud");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Configuration source type
    #[serde(default)]
    pub source: RepositorySource,

    /// File system base path (required for FileSystem source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    /// Database connection URL (required for Database source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Override read cache
    #[serde(default)]
    pub cache: CacheConfig,
}

impl RepositoryConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn file_system(path: impl Into<String>) -> Self {
        Self {
            source: RepositorySource::FileSystem,
            base_path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn database(url: impl Into<String>) -> Self {
        Self {
            source: RepositorySource::Database,
            database_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Validate that the required fields for the source are set
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.source {
            RepositorySource::Memory => Ok(()),
            RepositorySource::FileSystem => match self.base_path.as_deref() {
                Some(path) if !path.is_empty() => Ok(()),
                _ => Err(ConfigError::MissingField("base_path".to_string())),
            },
            RepositorySource::Database => match self.database_url.as_deref() {
                Some(url) if !url.is_empty() => Ok(()),
                _ => Err(ConfigError::MissingField("database_url".to_string())),
            },
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(RepositoryConfig::memory().validate().is_ok());
        assert!(RepositoryConfig::file_system("repo").validate().is_ok());
        assert!(RepositoryConfig::database("postgresql://x").validate().is_ok());

        let missing = RepositoryConfig {
            source: RepositorySource::Database,
            ..Default::default()
        };
        assert_eq!(
            missing.validate(),
            Err(ConfigError::MissingField("database_url".to_string()))
        );
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: RepositoryConfig =
            serde_json::from_str(r#"{"source":"file_system","base_path":"repo"}"#).unwrap();
        assert_eq!(config.source, RepositorySource::FileSystem);
        assert!(config.cache.enabled);
    }
}
