//! Durable storage: the key-value slot and the full-snapshot collection adapter.

mod collection;
mod kv;
mod memory;
mod schema;
mod types;

pub use collection::CollectionStore;
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use schema::Database;
pub use types::{DatabaseError, StorageError, StoreError};
