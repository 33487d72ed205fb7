//! List service for managing lists

use super::backend::{ListBackend, MemoryBackend};
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// List service that routes lookups to the backend registered for each list
///
/// Cloning is cheap; clones share the same backends.
#[derive(Clone, Default)]
pub struct ListService {
    backends: Arc<HashMap<String, Arc<dyn ListBackend>>>,
}

impl ListService {
    /// Service with no lists configured
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new_with_backends(backends: HashMap<String, Arc<dyn ListBackend>>) -> Self {
        Self {
            backends: Arc::new(backends),
        }
    }

    /// Service with a single in-memory list
    pub fn with_memory_list<I, S>(list_id: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut backends: HashMap<String, Arc<dyn ListBackend>> = HashMap::new();
        backends.insert(
            list_id.to_string(),
            Arc::new(MemoryBackend::with_values(list_id, values)),
        );
        Self::new_with_backends(backends)
    }

    /// Check if a value exists in a list
    ///
    /// A list that is not configured is treated as empty.
    pub async fn contains(&self, list_id: &str, value: &str) -> Result<bool> {
        match self.backends.get(list_id) {
            Some(backend) => backend.contains(list_id, value).await,
            None => {
                tracing::warn!("List '{}' not configured, treating as empty", list_id);
                Ok(false)
            }
        }
    }

    /// Get list of all configured list IDs
    pub fn list_ids(&self) -> Vec<String> {
        self.backends.keys().cloned().collect()
    }

    pub fn has_list(&self, list_id: &str) -> bool {
        self.backends.contains_key(list_id)
    }
}

impl std::fmt::Debug for ListService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListService")
            .field("lists", &self.list_ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_service_multiple_backends() {
        let mut backends: HashMap<String, Arc<dyn ListBackend>> = HashMap::new();
        backends.insert(
            "list1".to_string(),
            Arc::new(MemoryBackend::with_values("list1", ["value1"])),
        );
        backends.insert(
            "list2".to_string(),
            Arc::new(MemoryBackend::with_values("list2", ["value2"])),
        );

        let service = ListService::new_with_backends(backends);

        assert!(service.contains("list1", "value1").await.unwrap());
        assert!(!service.contains("list1", "value2").await.unwrap());
        assert!(service.contains("list2", "value2").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_list_is_empty() {
        let service = ListService::empty();
        assert!(!service.contains("disposableEmailDomains", "x.com").await.unwrap());
        assert!(!service.has_list("disposableEmailDomains"));
    }
}
