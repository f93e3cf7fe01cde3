//! Single-slot undo for deletions.
//!
//! Only the most recent deletion can be undone: a new deletion replaces the
//! pending record, silently discarding the older one.

use crate::model::Entity;
use crate::repository::{Removed, Repository, Result};

/// Asks the user to confirm a destructive action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Shows a transient notification with optional actions.
///
/// Returns the index of the action the user picked, or `None` if the
/// notification was dismissed or timed out.
pub trait Notify: Send + Sync {
    fn notify(&self, message: &str, actions: &[&str]) -> Option<usize>;
}

/// Label of the undo action offered after a delete.
pub const UNDO_ACTION: &str = "Undo";

/// Undo coordinator state.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoState<'a, E> {
    Idle,
    PendingUndo { entity: &'a E, index: usize },
}

/// Result of [`UndoDelete::delete_with_prompts`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome<E> {
    /// The user declined the confirmation; nothing changed.
    Cancelled,
    /// The entity was deleted and is pending undo.
    Deleted(Removed<E>),
    /// The entity was deleted and then restored from the notification.
    Restored(E),
}

pub struct UndoDelete<E> {
    repo: Repository<E>,
    pending: Option<Removed<E>>,
}

impl<E: Entity> UndoDelete<E> {
    pub fn new(repo: Repository<E>) -> Self {
        Self {
            repo,
            pending: None,
        }
    }

    pub fn state(&self) -> UndoState<'_, E> {
        match &self.pending {
            Some(removed) => UndoState::PendingUndo {
                entity: &removed.entity,
                index: removed.index,
            },
            None => UndoState::Idle,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Delete through the repository and remember the removal for undo.
    ///
    /// On failure (including `NotFound`) the pending record is unchanged.
    pub async fn delete(&mut self, id: &str) -> Result<Removed<E>> {
        let removed = self.repo.delete(id).await?;
        if let Some(previous) = self.pending.replace(removed.clone()) {
            tracing::debug!(kind = E::KIND, id = %previous.entity.id(), "Discarded older pending undo");
        }
        Ok(removed)
    }

    /// Reinsert the pending entity at its original index.
    ///
    /// Returns `Ok(None)` when nothing is pending. If the write fails the
    /// record stays pending so the undo can be retried.
    pub async fn undo(&mut self) -> Result<Option<E>> {
        let Some(removed) = self.pending.take() else {
            return Ok(None);
        };

        match self
            .repo
            .save_at(removed.entity.clone(), Some(removed.index))
            .await
        {
            Ok(_) => {
                tracing::debug!(kind = E::KIND, id = %removed.entity.id(), index = removed.index, "Undid delete");
                Ok(Some(removed.entity))
            }
            Err(e) => {
                self.pending = Some(removed);
                Err(e)
            }
        }
    }

    /// Forget the pending deletion; it can no longer be undone.
    pub fn discard(&mut self) {
        self.pending = None;
    }

    /// Confirm, delete, then offer an undo through the notification.
    pub async fn delete_with_prompts(
        &mut self,
        id: &str,
        confirm: &dyn Confirm,
        notify: &dyn Notify,
    ) -> Result<DeleteOutcome<E>> {
        let entity = self.repo.get_by_id(id)?;

        if !confirm.confirm(&format!("Delete '{}'?", entity.label())) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let removed = self.delete(id).await?;
        let choice = notify.notify(&format!("Deleted '{}'", entity.label()), &[UNDO_ACTION]);
        if choice == Some(0) {
            if let Some(restored) = self.undo().await? {
                return Ok(DeleteOutcome::Restored(restored));
            }
        }
        Ok(DeleteOutcome::Deleted(removed))
    }
}
