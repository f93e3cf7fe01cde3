//! The repository: single source of truth for one entity collection.
//!
//! Every mutation follows the same sequence:
//!
//! 1. take the write lock (mutations are totally ordered per repository)
//! 2. compute the next sequence from the current snapshot
//! 3. persist it through the [`CollectionStore`]
//! 4. only on success, swap the snapshot and broadcast it to subscribers
//!
//! A failed write therefore leaves memory and subscribers untouched.

mod error;
mod subscription;

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

use crate::model::{Completable, Entity};
use crate::storage::CollectionStore;

pub use error::{RepositoryError, Result};
pub use subscription::Subscription;

/// Immutable view of the collection at one point in time.
pub type Snapshot<E> = Arc<[E]>;

/// Default number of snapshots buffered per subscriber.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Largest per-subscriber buffer a repository will allocate.
pub const MAX_CHANNEL_CAPACITY: usize = 65_536;

/// Where [`Repository::save`] / [`Repository::save_at`] put the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new entity was inserted at this index.
    Inserted(usize),
    /// An entity with the same id was replaced at this index.
    Replaced(usize),
}

impl SaveOutcome {
    pub fn index(self) -> usize {
        match self {
            SaveOutcome::Inserted(i) | SaveOutcome::Replaced(i) => i,
        }
    }
}

/// An entity removed by [`Repository::delete`] and the position it held.
#[derive(Debug, Clone, PartialEq)]
pub struct Removed<E> {
    pub entity: E,
    pub index: usize,
}

/// Current snapshot and the channel that announces replacements.
///
/// Guarded by one lock so a new subscriber's initial snapshot and its
/// receiver are taken atomically with respect to publishes.
struct Published<E> {
    current: Snapshot<E>,
    sender: Option<broadcast::Sender<Snapshot<E>>>,
}

struct Inner<E> {
    store: CollectionStore<E>,
    published: Mutex<Published<E>>,
    write_lock: tokio::sync::Mutex<()>,
}

/// Cheaply cloneable handle to an entity collection.
pub struct Repository<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Entity> std::fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("kind", &E::KIND)
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<E: Entity> Repository<E> {
    /// Load the persisted collection and start serving it.
    ///
    /// # Errors
    ///
    /// Load failures (corrupt blob, duplicate ids, backend errors) are fatal
    /// for this entity kind and returned as `RepositoryError::Storage`.
    pub async fn open(store: CollectionStore<E>) -> Result<Self> {
        Self::open_with_capacity(store, DEFAULT_CHANNEL_CAPACITY).await
    }

    /// Like [`Repository::open`] with a custom subscriber buffer, clamped to
    /// `1..=MAX_CHANNEL_CAPACITY`.
    pub async fn open_with_capacity(store: CollectionStore<E>, capacity: usize) -> Result<Self> {
        let items = store.load_all().await?;
        let (sender, _) = broadcast::channel(capacity.clamp(1, MAX_CHANNEL_CAPACITY));

        tracing::debug!(kind = E::KIND, count = items.len(), "Opened repository");
        Ok(Self {
            inner: Arc::new(Inner {
                store,
                published: Mutex::new(Published {
                    current: items.into(),
                    sender: Some(sender),
                }),
                write_lock: tokio::sync::Mutex::new(()),
            }),
        })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Subscribe to the collection: the current snapshot, then every change.
    pub fn get_all(&self) -> Subscription<E> {
        let published = self.published();
        let receiver = published.sender.as_ref().map(|s| s.subscribe());
        Subscription::new(Arc::clone(&published.current), receiver, E::KIND)
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Snapshot<E> {
        Arc::clone(&self.published().current)
    }

    pub fn len(&self) -> usize {
        self.published().current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.published().current.is_empty()
    }

    /// Look up an entity by id.
    pub fn get_by_id(&self, id: &str) -> Result<E> {
        self.published()
            .current
            .iter()
            .find(|e| e.id() == id)
            .cloned()
            .ok_or_else(|| not_found::<E>(id))
    }

    /// Position of the entity with `id`, if present.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.published().current.iter().position(|e| e.id() == id)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Replace the entity with the same id in place, or append it.
    pub async fn save(&self, entity: E) -> Result<SaveOutcome> {
        self.save_at(entity, None).await
    }

    /// Replace the entity with the same id in place (ignoring `index`),
    /// otherwise insert at `index` clamped to the collection length, or
    /// append when `index` is `None`.
    pub async fn save_at(&self, entity: E, index: Option<usize>) -> Result<SaveOutcome> {
        let id = entity.id().to_string();
        let outcome = self
            .commit(|items| {
                let mut next = items.to_vec();
                let outcome = match next.iter().position(|e| e.id() == entity.id()) {
                    Some(existing) => {
                        next[existing] = entity;
                        SaveOutcome::Replaced(existing)
                    }
                    None => {
                        let at = index.map_or(next.len(), |i| i.min(next.len()));
                        next.insert(at, entity);
                        SaveOutcome::Inserted(at)
                    }
                };
                Ok((next, outcome))
            })
            .await?;

        tracing::debug!(kind = E::KIND, id = %id, ?outcome, "Saved entity");
        Ok(outcome)
    }

    /// Replace the entity with `id` by `f(current)`, keeping its position.
    ///
    /// Ids are immutable: a replacement with a different id is rejected
    /// with `IdChanged` and nothing is written.
    pub async fn update<F>(&self, id: &str, f: F) -> Result<E>
    where
        F: FnOnce(&E) -> E,
    {
        let updated = self
            .commit(|items| {
                let index = items
                    .iter()
                    .position(|e| e.id() == id)
                    .ok_or_else(|| not_found::<E>(id))?;
                let replacement = f(&items[index]);
                if replacement.id() != id {
                    return Err(RepositoryError::IdChanged {
                        kind: E::KIND,
                        expected: id.to_string(),
                        found: replacement.id().to_string(),
                    });
                }
                let mut next = items.to_vec();
                next[index] = replacement.clone();
                Ok((next, replacement))
            })
            .await?;

        tracing::debug!(kind = E::KIND, id = %id, "Updated entity");
        Ok(updated)
    }

    /// Remove the entity with `id`, reporting it and its former index.
    pub async fn delete(&self, id: &str) -> Result<Removed<E>> {
        let removed = self
            .commit(|items| {
                let index = items
                    .iter()
                    .position(|e| e.id() == id)
                    .ok_or_else(|| not_found::<E>(id))?;
                let mut next = items.to_vec();
                let entity = next.remove(index);
                Ok((next, Removed { entity, index }))
            })
            .await?;

        tracing::debug!(kind = E::KIND, id = %id, index = removed.index, "Deleted entity");
        Ok(removed)
    }

    /// End every subscription. Later mutations fail with `Closed`. Idempotent.
    pub fn close(&self) {
        let mut published = self.published();
        if published.sender.take().is_some() {
            tracing::debug!(kind = E::KIND, "Closed repository");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.published().sender.is_none()
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn published(&self) -> MutexGuard<'_, Published<E>> {
        // The guarded data is a pair of Arcs; a panic elsewhere cannot leave
        // it half-written, so a poisoned lock is still usable.
        self.inner
            .published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run one read-modify-write cycle: compute, persist, then publish.
    async fn commit<T, F>(&self, compute: F) -> Result<T>
    where
        F: FnOnce(&[E]) -> Result<(Vec<E>, T)>,
    {
        let _write = self.inner.write_lock.lock().await;
        if self.is_closed() {
            return Err(RepositoryError::Closed { kind: E::KIND });
        }

        let current = self.snapshot();
        let (next, output) = compute(&current)?;

        self.inner.store.save_all(&next).await?;

        let next: Snapshot<E> = next.into();
        let mut published = self.published();
        published.current = Arc::clone(&next);
        if let Some(sender) = &published.sender {
            // No receivers is fine: nobody is listening yet
            let _ = sender.send(next);
        }
        Ok(output)
    }
}

impl<E: Completable> Repository<E> {
    /// Remove every completed entity, preserving the order of the rest.
    /// Returns the number removed.
    pub async fn clear_completed(&self) -> Result<usize> {
        let removed = self
            .commit(|items| {
                let next: Vec<E> = items.iter().filter(|e| !e.is_completed()).cloned().collect();
                let removed = items.len() - next.len();
                Ok((next, removed))
            })
            .await?;

        tracing::debug!(kind = E::KIND, removed, "Cleared completed entities");
        Ok(removed)
    }

    /// Set every entity's completion flag to `value`.
    /// Returns the number of entities whose flag actually changed.
    pub async fn complete_all(&self, value: bool) -> Result<usize> {
        let changed = self
            .commit(|items| {
                let mut changed = 0;
                let next = items
                    .iter()
                    .map(|e| {
                        if e.is_completed() == value {
                            e.clone()
                        } else {
                            changed += 1;
                            e.with_completed(value)
                        }
                    })
                    .collect();
                Ok((next, changed))
            })
            .await?;

        tracing::debug!(kind = E::KIND, value, changed, "Set completion on all entities");
        Ok(changed)
    }

    /// Complete everything, or reopen everything if all are already complete.
    pub async fn toggle_all(&self) -> Result<usize> {
        let all_completed = self.snapshot().iter().all(|e| e.is_completed());
        self.complete_all(!all_completed).await
    }

    /// Set the completion flag of one entity.
    pub async fn set_completed(&self, id: &str, value: bool) -> Result<E> {
        self.update(id, |e| e.with_completed(value)).await
    }
}

fn not_found<E: Entity>(id: &str) -> RepositoryError {
    RepositoryError::NotFound {
        kind: E::KIND,
        id: id.to_string(),
    }
}
