//! In-memory list backend
//!
//! Simple memory-based list storage for testing and development.

use super::{normalize_entry, ListBackend};
use crate::error::Result;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// In-memory list backend
///
/// Stores list data in memory using HashSets. Data is lost when the
/// process restarts.
#[derive(Default)]
pub struct MemoryBackend {
    /// Map of list_id -> set of values
    lists: RwLock<HashMap<String, HashSet<String>>>,
}

impl MemoryBackend {
    /// Create a new memory backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend seeded with one list
    pub fn with_values<I, S>(list_id: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = values
            .into_iter()
            .map(|value| normalize_entry(&value.into()))
            .collect();
        let mut lists = HashMap::new();
        lists.insert(list_id.to_string(), set);
        Self {
            lists: RwLock::new(lists),
        }
    }
}

#[async_trait::async_trait]
impl ListBackend for MemoryBackend {
    async fn contains(&self, list_id: &str, value: &str) -> Result<bool> {
        let lists = self.lists.read().await;
        Ok(lists
            .get(list_id)
            .map(|list| list.contains(&normalize_entry(value)))
            .unwrap_or(false))
    }

    async fn add(&self, list_id: &str, value: String) -> Result<()> {
        let mut lists = self.lists.write().await;
        lists.entry(list_id.to_string()).or_default().insert(normalize_entry(&value));
        Ok(())
    }

    async fn remove(&self, list_id: &str, value: &str) -> Result<()> {
        let mut lists = self.lists.write().await;
        if let Some(list) = lists.get_mut(list_id) {
            list.remove(&normalize_entry(value));
        }
        Ok(())
    }

    async fn get_all(&self, list_id: &str) -> Result<Vec<String>> {
        let lists = self.lists.read().await;
        Ok(lists
            .get(list_id)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_contains() {
        let backend = MemoryBackend::new();
        backend.add("domains", "mailinator.com".to_string()).await.unwrap();
        backend.add("domains", "yopmail.com".to_string()).await.unwrap();

        assert!(backend.contains("domains", "mailinator.com").await.unwrap());
        assert!(!backend.contains("domains", "gmail.com").await.unwrap());

        // Check non-existent list
        assert!(!backend.contains("other", "mailinator.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_backend_ignores_case() {
        let backend = MemoryBackend::with_values("domains", ["Mailinator.com", " YOPmail.com "]);
        assert!(backend.contains("domains", "mailinator.com").await.unwrap());
        assert!(backend.contains("domains", "MAILINATOR.COM").await.unwrap());
        assert!(backend.contains("domains", "yopmail.com").await.unwrap());

        backend.add("domains", "TrashMail.com".to_string()).await.unwrap();
        assert!(backend.contains("domains", "trashmail.com").await.unwrap());

        backend.remove("domains", "MAILINATOR.com").await.unwrap();
        assert!(!backend.contains("domains", "mailinator.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_backend_remove() {
        let backend = MemoryBackend::with_values("domains", ["mailinator.com"]);
        assert!(backend.contains("domains", "mailinator.com").await.unwrap());

        backend.remove("domains", "mailinator.com").await.unwrap();
        assert!(!backend.contains("domains", "mailinator.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_backend_get_all() {
        let backend = MemoryBackend::with_values("domains", ["a.com", "b.com"]);
        let mut values = backend.get_all("domains").await.unwrap();
        values.sort();
        assert_eq!(values, vec!["a.com".to_string(), "b.com".to_string()]);
        assert!(backend.get_all("missing").await.unwrap().is_empty());
    }
}
