//! Local to-do list core: todos and categories kept in observable,
//! persisted collections with filtered views and undoable deletes.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ticklist::model::Todo;
//! use ticklist::repository::Repository;
//! use ticklist::storage::{CollectionStore, Database};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let db = Database::open("ticklist.db").await?;
//! let todos: Repository<Todo> = Repository::open(CollectionStore::new(Arc::new(db))).await?;
//! todos.save(Todo::new("Water the plants")).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod filter;
pub mod model;
pub mod preferences;
pub mod repository;
pub mod stats;
pub mod storage;
pub mod undo;
pub mod util;
