//! In-process key-value store for tests and ephemeral sessions.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::kv::{check_size, KeyValueStore};
use super::types::StoreError;

/// `BTreeMap`-backed store; keys iterate in order so prefix scans come back sorted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    max_value_bytes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects values larger than `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Mutex::default(),
            max_value_bytes: limit,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        check_size(key, value, self.max_value_bytes)?;
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn entries_with_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self
            .lock()?
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.lock()?.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

        assert!(store.remove("k").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_prefix_scan_is_ordered() {
        let store = MemoryStore::new();
        store.set("pref.b", "2").await.unwrap();
        store.set("other", "x").await.unwrap();
        store.set("pref.a", "1").await.unwrap();

        let entries = store.entries_with_prefix("pref.").await.unwrap();
        assert_eq!(
            entries,
            vec![
                ("pref.a".to_string(), "1".to_string()),
                ("pref.b".to_string(), "2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_limit_rejects_large_values() {
        let store = MemoryStore::with_limit(4);
        store.set("k", "abcd").await.unwrap();
        assert!(matches!(
            store.set("k", "abcde").await,
            Err(StoreError::TooLarge { .. })
        ));
        assert_eq!(store.get("k").await.unwrap(), Some("abcd".to_string()));
    }
}
