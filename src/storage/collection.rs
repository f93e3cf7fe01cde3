use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use super::kv::KeyValueStore;
use super::types::StorageError;
use crate::model::Entity;

/// Full-snapshot persistence of one entity collection.
///
/// The whole ordered sequence is serialized as a single JSON array and
/// written under one key; every save replaces the previous blob.
pub struct CollectionStore<E> {
    store: Arc<dyn KeyValueStore>,
    key: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for CollectionStore<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> CollectionStore<E> {
    /// Adapter writing under the entity's fixed storage key.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, E::STORAGE_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            _entity: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the persisted collection, preserving order.
    ///
    /// A missing or blank blob is the empty collection, not an error.
    ///
    /// # Errors
    ///
    /// `StorageError::Corrupt` if the blob does not deserialize,
    /// `StorageError::DuplicateId` if two records share an id.
    pub async fn load_all(&self) -> Result<Vec<E>, StorageError> {
        let Some(blob) = self.store.get(&self.key).await? else {
            tracing::debug!(key = %self.key, kind = E::KIND, "No persisted collection, starting empty");
            return Ok(Vec::new());
        };

        if blob.trim().is_empty() {
            return Ok(Vec::new());
        }

        let items: Vec<E> =
            serde_json::from_str(&blob).map_err(|source| StorageError::Corrupt {
                key: self.key.clone(),
                source,
            })?;

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id()) {
                return Err(StorageError::DuplicateId {
                    key: self.key.clone(),
                    id: item.id().to_string(),
                });
            }
        }

        tracing::debug!(key = %self.key, kind = E::KIND, count = items.len(), "Loaded collection");
        Ok(items)
    }

    /// Serialize `items` and overwrite the persisted blob with one write.
    pub async fn save_all(&self, items: &[E]) -> Result<(), StorageError> {
        let blob = serde_json::to_string(items).map_err(|source| StorageError::Serialize {
            key: self.key.clone(),
            source,
        })?;
        self.store.set(&self.key, &blob).await?;
        Ok(())
    }
}
