use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity::{id_or_generate, Entity};

fn default_active() -> bool {
    true
}

/// A grouping for todos.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Input for [`Category::create`].
#[derive(Debug, Clone, Default)]
pub struct CategoryDraft {
    pub id: Option<String>,
    pub name: String,
}

/// Named overrides for [`Category::copy_with`].
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub active: Option<bool>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self::create(CategoryDraft {
            id: None,
            name: name.into(),
        })
    }

    /// New active category; a missing or blank id is generated.
    pub fn create(draft: CategoryDraft) -> Self {
        Self {
            id: id_or_generate(draft.id),
            name: draft.name,
            active: true,
        }
    }

    /// The sentinel: empty id and name, inactive.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn copy_with(&self, changes: CategoryChanges) -> Self {
        Self {
            id: self.id.clone(),
            name: changes.name.unwrap_or_else(|| self.name.clone()),
            active: changes.active.unwrap_or(self.active),
        }
    }
}

impl Entity for Category {
    const KIND: &'static str = "category";
    const STORAGE_KEY: &'static str = "__categories_collection_key__";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn is_empty(&self) -> bool {
        self.id.is_empty() && self.name.is_empty() && !self.active
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.active {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} (inactive)", self.name)
        }
    }
}
