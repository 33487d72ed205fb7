//! Builder pattern for FraudDetector

use crate::config::DetectorConfig;
use crate::detector::FraudDetector;
use crate::error::{Result, SdkError};
use fraudguard_repository::{
    EnrollmentRepository, FileSystemRepository, FraudEventRepository, MemoryRepository,
    OverrideRepository, RepositoryConfig, RepositorySource,
};
use fraudguard_runtime::{ListLoader, ListService, RuleEnv, RuleExecutor, RuleRegistry};
use std::sync::Arc;

/// Builder for FraudDetector
///
/// Stores and lists that are not set explicitly are created from the
/// [`DetectorConfig`].
///
/// # Example
///
/// ```rust,ignore
/// use fraudguard_sdk::{DetectorConfig, FraudDetectorBuilder};
/// use fraudguard_repository::RepositoryConfig;
///
/// // Overrides from YAML files, events kept in memory
/// let detector = FraudDetectorBuilder::new()
///     .with_config(DetectorConfig::default().with_repository(RepositoryConfig::file_system("repository")))
///     .build()
///     .await?;
///
/// // Everything in memory (tests)
/// let repo = Arc::new(MemoryRepository::new());
/// let detector = FraudDetectorBuilder::new()
///     .with_memory_repository(repo.clone())
///     .build()
///     .await?;
/// ```
#[derive(Default)]
pub struct FraudDetectorBuilder {
    config: DetectorConfig,
    registry: Option<Arc<RuleRegistry>>,
    overrides: Option<Arc<dyn OverrideRepository>>,
    events: Option<Arc<dyn FraudEventRepository>>,
    enrollments: Option<Arc<dyn EnrollmentRepository>>,
    lists: Option<ListService>,
}

impl FraudDetectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: DetectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom rule registry instead of the built-in catalog
    pub fn with_registry(mut self, registry: Arc<RuleRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use one in-memory repository for overrides, events and enrollments
    pub fn with_memory_repository(mut self, repository: Arc<MemoryRepository>) -> Self {
        self.overrides = Some(repository.clone());
        self.events = Some(repository.clone());
        self.enrollments = Some(repository);
        self
    }

    pub fn with_override_repository(mut self, repository: Arc<dyn OverrideRepository>) -> Self {
        self.overrides = Some(repository);
        self
    }

    pub fn with_event_repository(mut self, repository: Arc<dyn FraudEventRepository>) -> Self {
        self.events = Some(repository);
        self
    }

    pub fn with_enrollment_repository(mut self, repository: Arc<dyn EnrollmentRepository>) -> Self {
        self.enrollments = Some(repository);
        self
    }

    pub fn with_list_service(mut self, lists: ListService) -> Self {
        self.lists = Some(lists);
        self
    }

    /// Build the detector
    pub async fn build(self) -> Result<FraudDetector> {
        self.config.validate()?;
        let policy = self.config.risk_policy()?;

        let stores = Stores::from_config(&self.config.repository).await?;
        if self.config.repository.source == RepositorySource::FileSystem {
            if self.events.is_none() {
                tracing::warn!(
                    "File system repository keeps fraud events in memory; they are lost on exit"
                );
            }
            if self.enrollments.is_none() {
                tracing::warn!(
                    "File system repository has no enrollment store; partner_cross_program_ban will never trigger"
                );
            }
        }
        let overrides = self.overrides.unwrap_or(stores.overrides);
        let events = self.events.unwrap_or(stores.events);
        let enrollments = self.enrollments.unwrap_or(stores.enrollments);

        let lists = match self.lists {
            Some(lists) => lists,
            None => Self::load_lists(&self.config, &stores.list_loader).await?,
        };
        if !lists.has_list(&self.config.disposable_list_key) {
            tracing::warn!(
                "List '{}' is not configured; disposable email rules will never trigger",
                self.config.disposable_list_key
            );
        }

        let env = RuleEnv::new(lists, enrollments)
            .with_disposable_list_key(self.config.disposable_list_key.clone())
            .with_lookup_timeout(self.config.lookup_timeout());
        let registry = self.registry.unwrap_or_else(RuleRegistry::global);

        tracing::info!(
            "Fraud detector ready: {} rules, repository {:?}",
            registry.len(),
            self.config.repository.source
        );

        Ok(FraudDetector::new(
            RuleExecutor::new(registry, env),
            overrides,
            events,
            policy,
            self.config.persistence.clone(),
            self.config.rule_timeout(),
        ))
    }

    async fn load_lists(config: &DetectorConfig, loader: &ListLoader) -> Result<ListService> {
        match &config.lists_file {
            Some(path) => Ok(loader.load_file(path).await?),
            None => Ok(ListService::empty()),
        }
    }
}

/// Stores derived from the repository configuration
struct Stores {
    overrides: Arc<dyn OverrideRepository>,
    events: Arc<dyn FraudEventRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    list_loader: ListLoader,
}

impl Stores {
    async fn from_config(config: &RepositoryConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| SdkError::ConfigError(e.to_string()))?;

        match config.source {
            RepositorySource::Memory => {
                let memory = Arc::new(MemoryRepository::new());
                Ok(Self {
                    overrides: memory.clone(),
                    events: memory.clone(),
                    enrollments: memory,
                    list_loader: ListLoader::new("."),
                })
            }
            RepositorySource::FileSystem => {
                let base_path = config.base_path.as_deref().unwrap_or_default();
                let files = FileSystemRepository::with_cache_config(base_path, config.cache.clone())?;
                let memory = Arc::new(MemoryRepository::new());
                Ok(Self {
                    overrides: Arc::new(files),
                    events: memory.clone(),
                    enrollments: memory,
                    list_loader: ListLoader::new(base_path),
                })
            }
            RepositorySource::Database => Self::database(config).await,
        }
    }

    #[cfg(feature = "sqlx")]
    async fn database(config: &RepositoryConfig) -> Result<Self> {
        let url = config.database_url.as_deref().unwrap_or_default();
        let postgres = fraudguard_repository::PostgresRepository::new(url)
            .await?
            .with_cache_config(config.cache.clone());
        let list_loader = ListLoader::new(".").with_db_pool(Arc::new(postgres.pool().clone()));
        let postgres = Arc::new(postgres);
        Ok(Self {
            overrides: postgres.clone(),
            events: postgres.clone(),
            enrollments: postgres,
            list_loader,
        })
    }

    #[cfg(not(feature = "sqlx"))]
    async fn database(_config: &RepositoryConfig) -> Result<Self> {
        Err(SdkError::ConfigError(
            "database repository requires the `sqlx` feature".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudguard_core::RiskWeights;

    #[tokio::test]
    async fn test_build_with_defaults() {
        let detector = FraudDetectorBuilder::new().build().await.unwrap();
        assert_eq!(detector.registry().len(), RuleRegistry::builtin().len());
    }

    #[tokio::test]
    async fn test_build_rejects_bad_weights() {
        let config = DetectorConfig::default().with_risk_weights(RiskWeights {
            low: 10,
            medium: 5,
            high: 1,
        });
        let result = FraudDetectorBuilder::new().with_config(config).build().await;
        assert!(matches!(result, Err(SdkError::CoreError(_))));
    }

    #[tokio::test]
    async fn test_build_file_system_requires_existing_root() {
        let config = DetectorConfig::default()
            .with_repository(RepositoryConfig::file_system("/nonexistent/fraud-repo"));
        let result = FraudDetectorBuilder::new().with_config(config).build().await;
        assert!(matches!(result, Err(SdkError::RepositoryError(_))));
    }

    #[cfg(not(feature = "sqlx"))]
    #[tokio::test]
    async fn test_database_needs_feature() {
        let config = DetectorConfig::default()
            .with_repository(RepositoryConfig::database("postgresql://localhost/fraud"));
        let result = FraudDetectorBuilder::new().with_config(config).build().await;
        assert!(matches!(result, Err(SdkError::ConfigError(_))));
    }
}
