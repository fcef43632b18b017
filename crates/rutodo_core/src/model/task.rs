//! Task item model.
//!
//! # Invariants
//! - `id` is generated once at creation and never changes afterwards.
//! - Non-empty `title`/`category` are input rules for callers; the model
//!   stores whatever it is given.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task item.
pub type TaskId = Uuid;

/// One entry of the to-do list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub id: TaskId,
    pub title: String,
    /// Free-form, may be empty.
    pub description: String,
    pub category: String,
    pub is_done: bool,
}

impl TaskItem {
    /// Creates an open task with a freshly generated id.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), title, description, category)
    }

    /// Creates an open task with a caller-provided id.
    pub fn with_id(
        id: TaskId,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            category: category.into(),
            is_done: false,
        }
    }

    /// Returns a copy with `is_done` flipped. Applying it twice is a no-op.
    pub fn toggled(&self) -> Self {
        Self {
            is_done: !self.is_done,
            ..self.clone()
        }
    }
}
