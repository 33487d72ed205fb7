//! File system based override repository
//!
//! Overrides live in one YAML file per program:
//!
//! ```text
//! <root>/programs/<program_id>.yaml
//! ```
//!
//! ```yaml
//! overrides:
//!   - id: fr_123
//!     ruleType: self_referral
//!     riskLevel: high
//!     config:
//!       similarityThreshold: 0.9
//!   - id: fr_124
//!     ruleType: partner_no_social_links
//!     riskLevel: low
//!     disabledAt: 2024-05-01T00:00:00Z
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fraudguard_core::{FraudRuleOverride, RiskLevel};
use path_absolutize::Absolutize;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::{error::RepositoryError, models::*, traits::*, CacheStats, RepositoryResult};

const PROGRAMS_DIR: &str = "programs";

#[derive(Debug, Deserialize)]
struct ProgramOverridesFile {
    #[serde(default)]
    overrides: Vec<OverrideEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverrideEntry {
    id: String,
    rule_type: String,
    risk_level: RiskLevel,
    #[serde(default)]
    config: Option<serde_json::Value>,
    #[serde(default)]
    disabled_at: Option<DateTime<Utc>>,
}

/// File system based override repository with TTL caching
pub struct FileSystemRepository {
    /// Root path of the repository
    root_path: PathBuf,
    cache: OverrideCache,
}

impl FileSystemRepository {
    /// Create a new file system repository
    ///
    /// # Example
    /// ```no_run
    /// use fraudguard_repository::FileSystemRepository;
    ///
    /// let repo = FileSystemRepository::new("repository").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(root_path: P) -> RepositoryResult<Self> {
        Self::with_cache_config(root_path, CacheConfig::default())
    }

    /// Create a new file system repository with custom cache configuration
    pub fn with_cache_config<P: AsRef<Path>>(
        root_path: P,
        config: CacheConfig,
    ) -> RepositoryResult<Self> {
        let path = root_path.as_ref();

        if !path.exists() {
            return Err(RepositoryError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let abs_path = path
            .absolutize()
            .map_err(|e| RepositoryError::Other(format!("Failed to absolutize path: {}", e)))?
            .to_path_buf();

        Ok(Self {
            root_path: abs_path,
            cache: OverrideCache::new(config),
        })
    }

    /// Get the root path of this repository
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn program_file(&self, program_id: &str) -> RepositoryResult<PathBuf> {
        let valid = !program_id.is_empty()
            && program_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(RepositoryError::InvalidPath {
                path: PathBuf::from(program_id),
            });
        }
        Ok(self
            .root_path
            .join(PROGRAMS_DIR)
            .join(format!("{}.yaml", program_id)))
    }

    async fn read_program(&self, program_id: &str) -> RepositoryResult<Vec<FraudRuleOverride>> {
        let path = self.program_file(program_id)?;
        if !fs::try_exists(&path).await? {
            tracing::debug!("No override file for program {}", program_id);
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).await?;
        let file: ProgramOverridesFile = serde_yaml::from_str(&content)?;

        let mut seen = HashSet::new();
        let mut overrides = Vec::with_capacity(file.overrides.len());
        for entry in file.overrides {
            let Some(rule_type) = known_rule_type(program_id, &entry.id, &entry.rule_type) else {
                continue;
            };
            if !seen.insert(rule_type) {
                return Err(RepositoryError::DuplicateOverride {
                    program_id: program_id.to_string(),
                    rule_type: rule_type.to_string(),
                });
            }
            overrides.push(FraudRuleOverride {
                id: entry.id,
                program_id: program_id.to_string(),
                rule_type,
                risk_level: entry.risk_level,
                config: entry.config,
                disabled_at: entry.disabled_at,
            });
        }

        Ok(overrides)
    }
}

#[async_trait]
impl OverrideRepository for FileSystemRepository {
    async fn list_overrides(&self, program_id: &str) -> RepositoryResult<Vec<FraudRuleOverride>> {
        if let Some(cached) = self.cache.get(program_id) {
            return Ok(cached);
        }

        let overrides = self.read_program(program_id).await?;
        self.cache.put(program_id, overrides.clone());
        Ok(overrides)
    }
}

impl CacheableRepository for FileSystemRepository {
    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }

    fn invalidate(&self, program_id: &str) {
        self.cache.invalidate(program_id);
    }
}
