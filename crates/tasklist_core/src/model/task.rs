//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted by the task store.
//! - Provide the completion filter used by list views.
//!
//! # Invariants
//! - `id` is unique within one task collection and never reused.
//! - `text` is non-empty after trimming.
//! - Wire field names (`id`, `text`, `completed`) are fixed; stored data has
//!   no schema version.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a task.
///
/// Stored ids are opaque strings; freshly generated ids are UUID v4 text.
pub type TaskId = String;

/// Validation error for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyId,
    EmptyText,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "task id cannot be empty"),
            Self::EmptyText => write!(f, "task text cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// Single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// User-entered text, kept as typed.
    pub text: String,
    pub completed: bool,
}

impl Task {
    /// Creates an active task with a generated id.
    ///
    /// # Errors
    /// - Returns `EmptyText` when `text` is empty after trimming.
    pub fn new(text: impl Into<String>) -> Result<Self, TaskValidationError> {
        Self::with_id(generate_task_id(), text)
    }

    /// Creates an active task with a caller-provided id.
    ///
    /// Used by import and test paths where identity already exists.
    pub fn with_id(
        id: impl Into<TaskId>,
        text: impl Into<String>,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id: id.into(),
            text: text.into(),
            completed: false,
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.text.trim().is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        Ok(())
    }

    /// Flips the completion flag.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// Returns a new collision-resistant task id.
pub fn generate_task_id() -> TaskId {
    Uuid::new_v4().to_string()
}

/// Completion criterion for list views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    /// All criteria in display order.
    pub const ALL: [TaskFilter; 3] = [TaskFilter::All, TaskFilter::Active, TaskFilter::Completed];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }
}

impl Display for TaskFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a filter name is not one of `all|active|completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTaskFilterError(pub String);

impl Display for ParseTaskFilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported filter `{}`; expected all|active|completed",
            self.0
        )
    }
}

impl Error for ParseTaskFilterError {}

impl FromStr for TaskFilter {
    type Err = ParseTaskFilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(ParseTaskFilterError(other.to_string())),
        }
    }
}

/// Returns tasks matching `filter`, preserving relative order.
pub fn filter_tasks(tasks: &[Task], filter: TaskFilter) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect()
}
