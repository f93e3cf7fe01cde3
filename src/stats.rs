use crate::model::Todo;

/// Completion counts over a todo collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
}

impl TodoStats {
    pub fn from_items(items: &[Todo]) -> Self {
        let completed = items.iter().filter(|t| t.is_completed).count();
        Self {
            total: items.len(),
            completed,
            active: items.len() - completed,
        }
    }
}
