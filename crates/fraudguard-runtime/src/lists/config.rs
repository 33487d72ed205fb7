//! List configuration and loading
//!
//! ```yaml
//! lists:
//!   - id: disposableEmailDomains
//!     backend: file
//!     path: lists/disposable_domains.txt
//!     reload_interval: 300
//!   - id: partnerBlocklist
//!     backend: memory
//!     initial_values: [spam.example]
//! ```

use super::backend::{FileBackend, ListBackend, MemoryBackend};
use super::service::ListService;
use crate::error::{Result, RuntimeError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "sqlx")]
use super::backend::PostgresBackend;
#[cfg(feature = "sqlx")]
use sqlx::PgPool;

/// Backend type
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListBackendType {
    #[default]
    Memory,
    File,
    PostgreSQL,
}

/// One list definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// List ID (unique identifier)
    pub id: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub backend: ListBackendType,

    /// Values for the memory backend
    #[serde(default)]
    pub initial_values: Vec<String>,

    /// File path for the file backend, relative to the loader's base dir
    #[serde(default)]
    pub path: Option<String>,

    /// Reload interval in seconds (file backend)
    #[serde(default)]
    pub reload_interval: Option<u64>,

    /// Custom table (postgresql backend), defaults to `list_entries`
    #[serde(default)]
    pub table: Option<String>,
}

/// Container for multiple list configurations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListsConfig {
    #[serde(default)]
    pub lists: Vec<ListConfig>,
}

impl ListsConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            RuntimeError::InvalidOperation(format!("Failed to parse list configuration: {}", e))
        })
    }
}

/// Builds a [`ListService`] from list configurations
pub struct ListLoader {
    base_dir: PathBuf,

    #[cfg(feature = "sqlx")]
    db_pool: Option<Arc<PgPool>>,
}

impl ListLoader {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            #[cfg(feature = "sqlx")]
            db_pool: None,
        }
    }

    /// Set the database pool for PostgreSQL backends
    #[cfg(feature = "sqlx")]
    pub fn with_db_pool(mut self, pool: Arc<PgPool>) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Read a YAML list configuration file and build the service
    pub async fn load_file(&self, config_path: impl AsRef<Path>) -> Result<ListService> {
        let path = self.base_dir.join(config_path);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            RuntimeError::InvalidOperation(format!(
                "Failed to read list configuration {}: {}",
                path.display(),
                e
            ))
        })?;
        self.build(&ListsConfig::from_yaml_str(&content)?).await
    }

    pub async fn build(&self, config: &ListsConfig) -> Result<ListService> {
        let mut backends: HashMap<String, Arc<dyn ListBackend>> = HashMap::new();

        for list in &config.lists {
            if backends.contains_key(&list.id) {
                return Err(RuntimeError::InvalidOperation(format!(
                    "List '{}' is defined more than once",
                    list.id
                )));
            }
            let backend = self.create_backend(list).await?;
            tracing::debug!("Configured list '{}' ({:?})", list.id, list.backend);
            backends.insert(list.id.clone(), backend);
        }

        Ok(ListService::new_with_backends(backends))
    }

    async fn create_backend(&self, list: &ListConfig) -> Result<Arc<dyn ListBackend>> {
        match list.backend {
            ListBackendType::Memory => Ok(Arc::new(MemoryBackend::with_values(
                &list.id,
                list.initial_values.iter().cloned(),
            ))),
            ListBackendType::File => {
                let path = list.path.as_deref().ok_or_else(|| {
                    RuntimeError::InvalidOperation(format!(
                        "List '{}' uses the file backend but has no path",
                        list.id
                    ))
                })?;
                let full_path = self.base_dir.join(path);
                let backend = match list.reload_interval {
                    Some(secs) => FileBackend::new_with_reload(full_path, secs),
                    None => FileBackend::new(full_path),
                };
                backend.load().await?;
                Ok(Arc::new(backend))
            }
            ListBackendType::PostgreSQL => self.create_postgres_backend(list),
        }
    }

    #[cfg(feature = "sqlx")]
    fn create_postgres_backend(&self, list: &ListConfig) -> Result<Arc<dyn ListBackend>> {
        let pool = self.db_pool.clone().ok_or_else(|| {
            RuntimeError::InvalidOperation(format!(
                "List '{}' uses the postgresql backend but no pool is set",
                list.id
            ))
        })?;
        match &list.table {
            Some(table) => Ok(Arc::new(PostgresBackend::new_with_custom_table(
                pool,
                table.clone(),
                "value",
                Some("expires_at".to_string()),
            )?)),
            None => Ok(Arc::new(PostgresBackend::new(pool))),
        }
    }

    #[cfg(not(feature = "sqlx"))]
    fn create_postgres_backend(&self, list: &ListConfig) -> Result<Arc<dyn ListBackend>> {
        Err(RuntimeError::InvalidOperation(format!(
            "List '{}' needs the postgresql backend; enable the `sqlx` feature",
            list.id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_build_memory_and_file_lists() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("disposable.txt")).unwrap();
        writeln!(file, "mailinator.com\nyopmail.com").unwrap();

        let config = ListsConfig::from_yaml_str(
            r#"
lists:
  - id: disposableEmailDomains
    backend: file
    path: disposable.txt
  - id: blocked
    initial_values: [Spam.Example]
"#,
        )
        .unwrap();

        let service = ListLoader::new(dir.path()).build(&config).await.unwrap();
        assert!(service.contains("disposableEmailDomains", "yopmail.com").await.unwrap());
        assert!(service.contains("blocked", "spam.example").await.unwrap());
        assert!(!service.contains("blocked", "gmail.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_list_id_rejected() {
        let config = ListsConfig::from_yaml_str(
            "lists:\n  - id: a\n  - id: a\n",
        )
        .unwrap();
        assert!(ListLoader::new(".").build(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_file_backend_requires_path() {
        let config = ListsConfig::from_yaml_str("lists:\n  - id: a\n    backend: file\n").unwrap();
        assert!(ListLoader::new(".").build(&config).await.is_err());
    }
}
