//! Task store use-case service.
//!
//! # Responsibility
//! - Own the authoritative in-memory task collection.
//! - Mirror every mutation into the repository as one whole-collection write.
//!
//! # Invariants
//! - The in-memory collection only changes after a successful write, so it
//!   never diverges from the durable copy written by this store.
//! - Mutations on a store that was never loaded load first; a write never
//!   clobbers data the store has not seen.
//! - Not-found ids are silent no-ops and perform no write.
//! - `save` refuses collections with shared ids. Loaded legacy collections
//!   may already share ids; by-id operations then act on the first match.

use crate::logging::event_line;
use crate::model::task::{filter_tasks, Task, TaskFilter, TaskId, TaskValidationError};
use crate::repo::task_repo::{duplicate_ids, RepoError, TaskRepository};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, TaskStoreError>;

/// Error returned by task store operations.
#[derive(Debug)]
pub enum TaskStoreError {
    /// Task text is empty after trimming.
    EmptyText,
    /// A collection passed to `save` uses this id more than once.
    DuplicateId(TaskId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl TaskStoreError {
    /// Whether the error should be shown to the user as input rejection.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyText | Self::DuplicateId(_) | Self::Repo(RepoError::Validation(_))
        )
    }
}

impl Display for TaskStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "Task text cannot be empty"),
            Self::DuplicateId(id) => write!(f, "task id `{id}` is used more than once"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskStoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<TaskValidationError> for TaskStoreError {
    fn from(value: TaskValidationError) -> Self {
        match value {
            TaskValidationError::EmptyText => Self::EmptyText,
            other => Self::Repo(RepoError::Validation(other)),
        }
    }
}

/// Owner of the canonical task collection.
pub struct TaskStore<R: TaskRepository> {
    repo: R,
    tasks: Vec<Task>,
    loaded: bool,
}

impl<R: TaskRepository> TaskStore<R> {
    /// Creates an unloaded, empty store over `repo`.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            tasks: Vec::new(),
            loaded: false,
        }
    }

    /// Creates a store and loads the persisted collection.
    pub fn open(repo: R) -> StoreResult<Self> {
        let mut store = Self::new(repo);
        store.load()?;
        Ok(store)
    }

    /// Reads the persisted collection into memory.
    ///
    /// A missing value is the first-run state and yields an empty collection.
    ///
    /// # Errors
    /// - Storage read failures and corrupt data are returned unchanged; the
    ///   in-memory collection is left untouched.
    pub fn load(&mut self) -> StoreResult<&[Task]> {
        let tasks = match self.repo.load_tasks() {
            Ok(tasks) => tasks,
            Err(err) => {
                error!("{}", event_line("store", "tasks_load", "error", &[("error", &err)]));
                return Err(err.into());
            }
        };
        let first_run = tasks.is_none();
        self.tasks = tasks.unwrap_or_default();
        self.loaded = true;
        info!(
            "{}",
            event_line(
                "store",
                "tasks_load",
                "ok",
                &[("count", &self.tasks.len()), ("first_run", &first_run)],
            )
        );
        Ok(&self.tasks)
    }

    /// Writes `tasks` as the full collection, then adopts it in memory.
    ///
    /// Overwrites any previously stored value.
    ///
    /// # Errors
    /// - `DuplicateId` when two tasks share an id; nothing is written.
    pub fn save(&mut self, tasks: Vec<Task>) -> StoreResult<()> {
        if let Some(id) = duplicate_ids(&tasks).first() {
            return Err(TaskStoreError::DuplicateId(id.to_string()));
        }
        self.persist(tasks)
    }

    /// Appends a new active task and persists the collection.
    ///
    /// # Errors
    /// - `EmptyText` when `text` is empty after trimming; nothing changes.
    pub fn add(&mut self, text: impl Into<String>) -> StoreResult<Task> {
        let task = Task::new(text)?;
        self.ensure_loaded()?;

        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.persist(next)?;
        self.log_ok("task_add", &task.id);
        Ok(task)
    }

    /// Replaces the task with a matching id.
    ///
    /// Returns `Ok(false)` without writing when no task has that id.
    pub fn update(&mut self, task: Task) -> StoreResult<bool> {
        task.validate()?;
        self.ensure_loaded()?;

        let Some(index) = self.position(&task.id) else {
            self.log_not_found("task_update", &task.id);
            return Ok(false);
        };

        let task_id = task.id.clone();
        let mut next = self.tasks.clone();
        next[index] = task;
        self.persist(next)?;
        self.log_ok("task_update", &task_id);
        Ok(true)
    }

    /// Flips the completion flag of the task with `id`.
    ///
    /// Returns the updated task, or `Ok(None)` without writing when absent.
    pub fn toggle_completion(&mut self, id: &str) -> StoreResult<Option<Task>> {
        self.ensure_loaded()?;

        let Some(index) = self.position(id) else {
            self.log_not_found("task_toggle", id);
            return Ok(None);
        };

        let mut next = self.tasks.clone();
        next[index].toggle();
        let toggled = next[index].clone();
        self.persist(next)?;
        self.log_ok("task_toggle", id);
        Ok(Some(toggled))
    }

    /// Removes the task with `id`.
    ///
    /// Confirmation is the caller's concern. Returns `Ok(false)` without
    /// writing when absent.
    pub fn delete(&mut self, id: &str) -> StoreResult<bool> {
        self.ensure_loaded()?;

        let Some(index) = self.position(id) else {
            self.log_not_found("task_delete", id);
            return Ok(false);
        };

        let mut next = self.tasks.clone();
        next.remove(index);
        self.persist(next)?;
        self.log_ok("task_delete", id);
        Ok(true)
    }

    /// Returns the current snapshot narrowed by `filter`.
    pub fn filter(&self, filter: TaskFilter) -> Vec<Task> {
        filter_tasks(&self.tasks, filter)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn persist(&mut self, tasks: Vec<Task>) -> StoreResult<()> {
        if let Err(err) = self.repo.save_tasks(&tasks) {
            error!(
                "{}",
                event_line(
                    "store",
                    "tasks_save",
                    "error",
                    &[("count", &tasks.len()), ("error", &err)],
                )
            );
            return Err(err.into());
        }
        debug!(
            "{}",
            event_line("store", "tasks_save", "ok", &[("count", &tasks.len())])
        );
        self.tasks = tasks;
        self.loaded = true;
        Ok(())
    }

    fn ensure_loaded(&mut self) -> StoreResult<()> {
        if !self.loaded {
            self.load()?;
        }
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn log_ok(&self, event: &str, id: &str) {
        info!(
            "{}",
            event_line(
                "store",
                event,
                "ok",
                &[("task_id", &id), ("count", &self.tasks.len())],
            )
        );
    }

    fn log_not_found(&self, event: &str, id: &str) {
        debug!(
            "{}",
            event_line("store", event, "not_found", &[("task_id", &id)])
        );
    }
}
