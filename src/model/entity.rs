use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// A uniquely identified value stored in a repository.
///
/// The repository and storage adapter are generic over this trait, so one
/// implementation serves every entity kind.
pub trait Entity:
    Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Human-readable kind, used in errors and log fields.
    const KIND: &'static str;

    /// Key of the key-value slot holding the persisted collection.
    const STORAGE_KEY: &'static str;

    /// Identifier, unique within a collection and fixed for the entity's lifetime.
    fn id(&self) -> &str;

    /// Display text (title or name) used in prompts.
    fn label(&self) -> &str;

    /// True for the all-defaults sentinel value.
    fn is_empty(&self) -> bool;
}

/// Entities with a completion flag (todos).
pub trait Completable: Entity {
    fn is_completed(&self) -> bool;

    /// Copy of `self` with the completion flag set to `value`.
    fn with_completed(&self, value: bool) -> Self;
}

/// Generate a fresh entity id (UUID v4, hyphenated).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Resolve an optional caller-supplied id: blank or missing ids get a fresh one.
pub(crate) fn id_or_generate(id: Option<String>) -> String {
    match id {
        Some(id) if !id.trim().is_empty() => id,
        _ => generate_id(),
    }
}
