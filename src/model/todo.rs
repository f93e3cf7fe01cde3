use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity::{id_or_generate, Completable, Entity};

/// A to-do item.
///
/// Persisted as a flat JSON object with camelCase keys
/// (`id`, `title`, `description`, `isCompleted`, `categoryId`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    /// Id of the category this todo belongs to, if any.
    #[serde(default)]
    pub category_id: Option<String>,
}

/// Input for [`Todo::create`]. A missing or blank `id` gets a generated one.
#[derive(Debug, Clone, Default)]
pub struct TodoDraft {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub category_id: Option<String>,
}

/// Named overrides for [`Todo::copy_with`]. `None` keeps the current value.
///
/// `category_id` is doubly optional: `Some(None)` clears the category.
#[derive(Debug, Clone, Default)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
    pub category_id: Option<Option<String>>,
}

impl Todo {
    /// New incomplete todo with a generated id.
    pub fn new(title: impl Into<String>) -> Self {
        Self::create(TodoDraft {
            title: title.into(),
            ..TodoDraft::default()
        })
    }

    pub fn create(draft: TodoDraft) -> Self {
        Self {
            id: id_or_generate(draft.id),
            title: draft.title,
            description: draft.description,
            is_completed: false,
            category_id: draft.category_id,
        }
    }

    /// The all-defaults sentinel.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn copy_with(&self, changes: TodoChanges) -> Self {
        Self {
            id: self.id.clone(),
            title: changes.title.unwrap_or_else(|| self.title.clone()),
            description: changes
                .description
                .unwrap_or_else(|| self.description.clone()),
            is_completed: changes.is_completed.unwrap_or(self.is_completed),
            category_id: changes
                .category_id
                .unwrap_or_else(|| self.category_id.clone()),
        }
    }

    pub fn in_category(&self, category_id: &str) -> bool {
        self.category_id.as_deref() == Some(category_id)
    }
}

impl Entity for Todo {
    const KIND: &'static str = "todo";
    const STORAGE_KEY: &'static str = "__todos_collection_key__";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.title
    }

    fn is_empty(&self) -> bool {
        self.id.is_empty()
            && self.title.is_empty()
            && self.description.is_empty()
            && !self.is_completed
            && self.category_id.is_none()
    }
}

impl Completable for Todo {
    fn is_completed(&self) -> bool {
        self.is_completed
    }

    fn with_completed(&self, value: bool) -> Self {
        self.copy_with(TodoChanges {
            is_completed: Some(value),
            ..TodoChanges::default()
        })
    }
}

impl fmt::Display for Todo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.is_completed { "x" } else { " " };
        write!(f, "[{}] {}", mark, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assigns_id_and_defaults() {
        let todo = Todo::new("Buy milk");
        assert!(!todo.id.is_empty());
        assert_eq!(todo.title, "Buy milk");
        assert_eq!(todo.description, "");
        assert!(!todo.is_completed);
        assert_eq!(todo.category_id, None);
    }

    #[test]
    fn test_create_keeps_explicit_id() {
        let todo = Todo::create(TodoDraft {
            id: Some("todo-1".to_string()),
            title: "Write report".to_string(),
            description: "Quarterly".to_string(),
            category_id: Some("work".to_string()),
        });
        assert_eq!(todo.id, "todo-1");
        assert!(todo.in_category("work"));
    }

    #[test]
    fn test_copy_with_keeps_id_and_unchanged_fields() {
        let todo = Todo::new("Original");
        let updated = todo.copy_with(TodoChanges {
            title: Some("Renamed".to_string()),
            is_completed: Some(true),
            ..TodoChanges::default()
        });

        assert_eq!(updated.id, todo.id);
        assert_eq!(updated.title, "Renamed");
        assert!(updated.is_completed);
        assert_eq!(updated.description, todo.description);
        // Source value is untouched
        assert_eq!(todo.title, "Original");
        assert!(!todo.is_completed);
    }

    #[test]
    fn test_copy_with_clears_category() {
        let todo = Todo::create(TodoDraft {
            title: "Tagged".to_string(),
            category_id: Some("home".to_string()),
            ..TodoDraft::default()
        });
        let cleared = todo.copy_with(TodoChanges {
            category_id: Some(None),
            ..TodoChanges::default()
        });
        assert_eq!(cleared.category_id, None);
    }

    #[test]
    fn test_empty_sentinel() {
        assert!(Todo::empty().is_empty());
        assert!(!Todo::new("x").is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let todo = Todo::create(TodoDraft {
            id: Some("1".to_string()),
            title: "T".to_string(),
            description: String::new(),
            category_id: None,
        })
        .with_completed(true);

        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["isCompleted"], true);
        assert_eq!(json["categoryId"], serde_json::Value::Null);
        assert!(json.get("is_completed").is_none());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let todo: Todo = serde_json::from_str(r#"{"id":"7","title":"Minimal"}"#).unwrap();
        assert_eq!(todo.description, "");
        assert!(!todo.is_completed);
        assert_eq!(todo.category_id, None);
    }

    #[test]
    fn test_display_marks_completion() {
        let todo = Todo::new("Done thing").with_completed(true);
        assert_eq!(todo.to_string(), "[x] Done thing");
    }
}
