//! Entity types held by the repositories.
//!
//! Entities are immutable values: an update builds a new instance from an
//! existing one plus a set of overrides (`copy_with`), keeping the id.

mod category;
mod entity;
mod todo;

pub use category::{Category, CategoryChanges, CategoryDraft};
pub use entity::{generate_id, Completable, Entity};
pub use todo::{Todo, TodoChanges, TodoDraft};
