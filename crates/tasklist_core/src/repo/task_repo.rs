//! Task repository contract and key-value implementation.
//!
//! # Responsibility
//! - Serialize the full task collection into one JSON array under a fixed key.
//! - Reject invalid persisted state instead of masking it.
//!
//! # Invariants
//! - Write paths call `Task::validate()` on every record before writing.
//! - Read paths reject malformed JSON and invalid records.
//! - Duplicate ids are tolerated on read: data written by older clients used
//!   second-resolution timestamp ids, and such data must keep loading.

use crate::kv::{KeyValueStore, KvError};
use crate::logging::event_line;
use crate::model::task::{Task, TaskValidationError};
use log::warn;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized task array.
pub const TASKS_KEY: &str = "tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Kv(KvError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Kv(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Kv(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<KvError> for RepoError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

/// Whole-collection persistence for tasks.
pub trait TaskRepository {
    /// Returns `None` when nothing has been stored yet.
    fn load_tasks(&self) -> RepoResult<Option<Vec<Task>>>;
    fn save_tasks(&self, tasks: &[Task]) -> RepoResult<()>;
}

/// Task repository over any key-value store.
pub struct KvTaskRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvTaskRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> TaskRepository for KvTaskRepository<S> {
    fn load_tasks(&self) -> RepoResult<Option<Vec<Task>>> {
        let Some(raw) = self.store.get(TASKS_KEY)? else {
            return Ok(None);
        };
        decode_tasks(&raw).map(Some)
    }

    fn save_tasks(&self, tasks: &[Task]) -> RepoResult<()> {
        for task in tasks {
            task.validate()?;
        }
        let raw = encode_tasks(tasks)?;
        self.store.set(TASKS_KEY, &raw)?;
        Ok(())
    }
}

fn encode_tasks(tasks: &[Task]) -> RepoResult<String> {
    serde_json::to_string(tasks)
        .map_err(|err| RepoError::InvalidData(format!("failed to serialize tasks: {err}")))
}

fn decode_tasks(raw: &str) -> RepoResult<Vec<Task>> {
    let tasks: Vec<Task> = serde_json::from_str(raw)
        .map_err(|err| RepoError::InvalidData(format!("malformed `{TASKS_KEY}` value: {err}")))?;

    for task in &tasks {
        task.validate().map_err(|err| {
            RepoError::InvalidData(format!("invalid task `{}`: {err}", task.id))
        })?;
    }

    let duplicates = duplicate_ids(&tasks).len();
    if duplicates > 0 {
        warn!(
            "{}",
            event_line(
                "repo",
                "tasks_decode",
                "duplicate_ids",
                &[("duplicates", &duplicates), ("count", &tasks.len())],
            )
        );
    }

    Ok(tasks)
}

/// Ids that repeat an earlier task's id, in collection order.
pub fn duplicate_ids(tasks: &[Task]) -> Vec<&str> {
    let mut seen = HashSet::with_capacity(tasks.len());
    tasks
        .iter()
        .map(|task| task.id.as_str())
        .filter(|id| !seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{duplicate_ids, KvTaskRepository, RepoError, TaskRepository, TASKS_KEY};
    use crate::kv::{KeyValueStore, MemoryKvStore};
    use crate::model::task::Task;

    #[test]
    fn load_without_stored_value_returns_none() {
        let repo = KvTaskRepository::new(MemoryKvStore::new());
        assert!(repo.load_tasks().unwrap().is_none());
    }

    #[test]
    fn save_writes_json_array_under_fixed_key() {
        let store = MemoryKvStore::new();
        let repo = KvTaskRepository::new(store.clone());
        repo.save_tasks(&[Task::with_id("t1", "Buy milk").unwrap()])
            .unwrap();

        let raw = store.get(TASKS_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"[{"id":"t1","text":"Buy milk","completed":false}]"#);
    }

    #[test]
    fn load_accepts_legacy_date_string_ids() {
        let store = MemoryKvStore::new();
        store
            .set(
                TASKS_KEY,
                r#"[{"id":"Tue Mar 04 2025 10:00:00 GMT+0200","text":"x","completed":true}]"#,
            )
            .unwrap();

        let tasks = KvTaskRepository::new(store).load_tasks().unwrap().unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].completed);
    }

    #[test]
    fn load_rejects_malformed_json() {
        let store = MemoryKvStore::new();
        store.set(TASKS_KEY, "{not json").unwrap();

        let err = KvTaskRepository::new(store).load_tasks().unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }

    #[test]
    fn load_keeps_legacy_tasks_sharing_one_id() {
        let store = MemoryKvStore::new();
        store
            .set(
                TASKS_KEY,
                r#"[{"id":"Tue Mar 04 2025 10:00:00 GMT+0200","text":"x","completed":false},
                    {"id":"Tue Mar 04 2025 10:00:00 GMT+0200","text":"y","completed":true}]"#,
            )
            .unwrap();

        let tasks = KvTaskRepository::new(store).load_tasks().unwrap().unwrap();
        let texts: Vec<_> = tasks.iter().map(|task| task.text.as_str()).collect();
        assert_eq!(texts, ["x", "y"]);
        assert_eq!(duplicate_ids(&tasks), ["Tue Mar 04 2025 10:00:00 GMT+0200"]);
    }

    #[test]
    fn save_rejects_invalid_task_without_writing() {
        let store = MemoryKvStore::new();
        let repo = KvTaskRepository::new(store.clone());
        let mut task = Task::with_id("a", "x").unwrap();
        task.text = "  ".to_string();

        let err = repo.save_tasks(&[task]).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert!(store.is_empty());
    }
}
