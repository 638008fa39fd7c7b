//! Core domain logic for the task list.
//! This crate is the single source of truth for task invariants and storage.

pub mod config;
pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use kv::{KeyValueStore, KvError, KvResult, MemoryKvStore, SqliteKvStore};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    filter_tasks, generate_task_id, ParseTaskFilterError, Task, TaskFilter, TaskId,
    TaskValidationError,
};
pub use repo::task_repo::{KvTaskRepository, RepoError, RepoResult, TaskRepository, TASKS_KEY};
pub use service::task_store::{StoreResult, TaskStore, TaskStoreError};

/// Task store over the SQLite-backed durable key-value store.
pub type SqliteTaskStore = TaskStore<KvTaskRepository<SqliteKvStore>>;

/// Opens the database at `path` and loads the persisted task collection.
pub fn open_task_store(path: impl AsRef<std::path::Path>) -> StoreResult<SqliteTaskStore> {
    let kv = SqliteKvStore::open(path).map_err(RepoError::from)?;
    TaskStore::open(KvTaskRepository::new(kv))
}

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
