//! File-based list backend

use super::{normalize_entry, ListBackend};
use crate::error::{Result, RuntimeError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};

/// File-based list backend
///
/// Loads entries from a text file, one per line. Blank lines and lines
/// starting with `#` are skipped. The backend is read-only; it serves the
/// same entries for whatever list id it is registered under.
pub struct FileBackend {
    file_path: PathBuf,
    entries: Arc<RwLock<HashSet<String>>>,
    reload_task: Option<JoinHandle<()>>,
}

impl FileBackend {
    /// Create a new file backend. Call [`FileBackend::load`] before use.
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            entries: Arc::new(RwLock::new(HashSet::new())),
            reload_task: None,
        }
    }

    /// Create a file backend that re-reads its file every `reload_interval_secs`
    ///
    /// Must be called inside a tokio runtime. A failed reload keeps the
    /// previous entries.
    pub fn new_with_reload(file_path: impl Into<PathBuf>, reload_interval_secs: u64) -> Self {
        let mut backend = Self::new(file_path);
        let path = backend.file_path.clone();
        let entries = Arc::clone(&backend.entries);

        backend.reload_task = Some(tokio::spawn(async move {
            let mut timer = interval(Duration::from_secs(reload_interval_secs.max(1)));
            loop {
                timer.tick().await;
                match Self::load_from_file(&path).await {
                    Ok(loaded) => *entries.write().await = loaded,
                    Err(e) => tracing::warn!("Failed to reload list file {:?}: {}", path, e),
                }
            }
        }));

        backend
    }

    async fn load_from_file(path: &Path) -> Result<HashSet<String>> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            RuntimeError::InvalidOperation(format!(
                "Failed to read list file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(normalize_entry)
            .collect())
    }

    /// Load entries immediately
    pub async fn load(&self) -> Result<()> {
        let loaded = Self::load_from_file(&self.file_path).await?;
        tracing::debug!(
            "Loaded {} list entries from {}",
            loaded.len(),
            self.file_path.display()
        );
        *self.entries.write().await = loaded;
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Drop for FileBackend {
    fn drop(&mut self) {
        if let Some(task) = self.reload_task.take() {
            task.abort();
        }
    }
}

#[async_trait::async_trait]
impl ListBackend for FileBackend {
    async fn contains(&self, _list_id: &str, value: &str) -> Result<bool> {
        Ok(self.entries.read().await.contains(&normalize_entry(value)))
    }

    async fn add(&self, _list_id: &str, _value: String) -> Result<()> {
        Err(RuntimeError::InvalidOperation(
            "File backend is read-only".to_string(),
        ))
    }

    async fn remove(&self, _list_id: &str, _value: &str) -> Result<()> {
        Err(RuntimeError::InvalidOperation(
            "File backend is read-only".to_string(),
        ))
    }

    async fn get_all(&self, _list_id: &str) -> Result<Vec<String>> {
        Ok(self.entries.read().await.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_list(lines: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(lines.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_file_backend_load() {
        let file = write_list("# disposable providers\nmailinator.com\n\n  yopmail.com  \n");

        let backend = FileBackend::new(file.path());
        backend.load().await.unwrap();

        assert_eq!(backend.len().await, 2);
        assert!(backend.contains("any", "mailinator.com").await.unwrap());
        assert!(backend.contains("any", "yopmail.com").await.unwrap());
        assert!(!backend.contains("any", "# disposable providers").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_backend_mixed_case_entries() {
        let file = write_list("Mailinator.com
GUERRILLAMAIL.COM
");
        let backend = FileBackend::new(file.path());
        backend.load().await.unwrap();

        assert!(backend.contains("any", "mailinator.com").await.unwrap());
        assert!(backend.contains("any", "guerrillamail.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_backend_read_only() {
        let file = write_list("mailinator.com\n");
        let backend = FileBackend::new(file.path());
        backend.load().await.unwrap();

        assert!(backend.add("any", "x.com".to_string()).await.is_err());
        assert!(backend.remove("any", "mailinator.com").await.is_err());
    }

    #[tokio::test]
    async fn test_file_backend_missing_file() {
        let backend = FileBackend::new("/nonexistent/list.txt");
        assert!(backend.load().await.is_err());
        assert!(backend.is_empty().await);
    }
}
