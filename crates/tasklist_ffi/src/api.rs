//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level task functions to Dart via FRB.
//! - Keep error semantics simple for UI integration.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Calls touching the task store are serialized process-wide, so the
//!   whole-collection load/save of one call never interleaves with another.
//! - Delete confirmation happens in the UI before `task_delete` is called.

use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tasklist_core::logging::event_line;
use tasklist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_task_store,
    ping as ping_inner, AppConfig, SqliteTaskStore, StoreResult, Task, TaskFilter,
};

static STORE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Task row handed to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

impl From<Task> for TaskItem {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            text: task.text,
            completed: task.completed,
        }
    }
}

/// List response envelope for the task screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    /// Tasks matching `applied_filter`, in stored order.
    pub items: Vec<TaskItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// Effective filter label (`All|Active|Completed`).
    pub applied_filter: String,
}

/// Action response envelope for task mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether the operation succeeded. Not-found ids are not failures.
    pub ok: bool,
    /// Affected task after the operation, when one exists.
    pub task: Option<TaskItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task: Option<Task>) -> Self {
        Self {
            ok: true,
            task: task.map(TaskItem::from),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task: None,
            message: message.into(),
        }
    }
}

/// Lists tasks narrowed by `filter` (`all|active|completed`).
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Unknown or missing filters fall back to `All`.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_list(filter: Option<String>) -> TaskListResponse {
    let applied = normalize_filter(filter.as_deref());
    match with_task_store(|store| Ok(store.filter(applied))) {
        Ok(tasks) => {
            let message = if tasks.is_empty() {
                "No tasks.".to_string()
            } else {
                format!("Found {} task(s).", tasks.len())
            };
            TaskListResponse {
                items: tasks.into_iter().map(TaskItem::from).collect(),
                message,
                applied_filter: applied.label().to_string(),
            }
        }
        Err(err) => TaskListResponse {
            items: Vec::new(),
            message: format!("tasks_list failed: {err}"),
            applied_filter: applied.label().to_string(),
        },
    }
}

/// Creates a task from the add-task screen.
///
/// # FFI contract
/// - Input is trimmed before storing.
/// - Returns `ok=false` with the validation message for blank input.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(text: String) -> TaskActionResponse {
    let text = text.trim().to_string();
    match with_task_store(|store| store.add(text)) {
        Ok(task) => TaskActionResponse::success("Task created.", Some(task)),
        Err(err) => TaskActionResponse::failure(err),
    }
}

/// Replaces text and completion of an existing task from the detail screen.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update(id: String, text: String, completed: bool) -> TaskActionResponse {
    let task = Task {
        id,
        text: text.trim().to_string(),
        completed,
    };
    let updated = task.clone();
    match with_task_store(|store| store.update(task)) {
        Ok(true) => TaskActionResponse::success("Task updated.", Some(updated)),
        Ok(false) => TaskActionResponse::success("Task not found.", None),
        Err(err) => TaskActionResponse::failure(err),
    }
}

/// Flips completion of a task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(id: String) -> TaskActionResponse {
    match with_task_store(|store| store.toggle_completion(&id)) {
        Ok(Some(task)) => TaskActionResponse::success("Task toggled.", Some(task)),
        Ok(None) => TaskActionResponse::success("Task not found.", None),
        Err(err) => TaskActionResponse::failure(err),
    }
}

/// Deletes a task. The UI must confirm with the user first.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: String) -> TaskActionResponse {
    match with_task_store(|store| store.delete(&id)) {
        Ok(true) => TaskActionResponse::success("Task deleted.", None),
        Ok(false) => TaskActionResponse::success("Task not found.", None),
        Err(err) => TaskActionResponse::failure(err),
    }
}

fn normalize_filter(filter: Option<&str>) -> TaskFilter {
    match filter.map(str::parse::<TaskFilter>) {
        Some(Ok(filter)) => filter,
        Some(Err(err)) => {
            warn!(
                "{}",
                event_line("ffi", "tasks_list", "fallback", &[("error", &err)])
            );
            TaskFilter::All
        }
        None => TaskFilter::All,
    }
}

fn resolve_store_db_path() -> PathBuf {
    STORE_DB_PATH
        .get_or_init(|| match AppConfig::from_env() {
            Ok(config) => config.db_path,
            Err(err) => {
                warn!(
                    "{}",
                    event_line("ffi", "config_load", "fallback", &[("error", &err)])
                );
                AppConfig::default().db_path
            }
        })
        .clone()
}

fn with_task_store<T>(
    f: impl FnOnce(&mut SqliteTaskStore) -> StoreResult<T>,
) -> Result<T, String> {
    // A poisoned lock only means an earlier call panicked; the guard holds no data.
    let _guard = STORE_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let db_path = resolve_store_db_path();
    let mut store =
        open_task_store(&db_path).map_err(|err| format!("task store open failed: {err}"))?;
    f(&mut store).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, normalize_filter, ping, task_add, task_delete, task_toggle,
        task_update, tasks_list,
    };
    use std::time::{SystemTime, UNIX_EPOCH};
    use tasklist_core::TaskFilter;

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn unknown_filter_falls_back_to_all() {
        assert_eq!(normalize_filter(Some("weird")), TaskFilter::All);
        assert_eq!(normalize_filter(None), TaskFilter::All);
        assert_eq!(normalize_filter(Some("Active")), TaskFilter::Active);
    }

    #[test]
    fn task_add_trims_and_lists_created_task() {
        let text = unique_token("ffi-add");
        let created = task_add(format!("  {text}  "));
        assert!(created.ok, "{}", created.message);
        let task = created.task.expect("created task should be returned");
        assert_eq!(task.text, text);
        assert!(!task.completed);

        let active = tasks_list(Some("active".to_string()));
        assert_eq!(active.applied_filter, "Active");
        assert!(active.items.iter().any(|item| item.id == task.id));
    }

    #[test]
    fn task_add_rejects_blank_text() {
        let response = task_add("   ".to_string());
        assert!(!response.ok);
        assert_eq!(response.message, "Task text cannot be empty");
    }

    #[test]
    fn toggle_update_and_delete_flow() {
        let created = task_add(unique_token("ffi-flow"));
        let id = created.task.expect("created task").id;

        let toggled = task_toggle(id.clone());
        assert!(toggled.ok, "{}", toggled.message);
        assert!(toggled.task.expect("toggled task").completed);
        let completed = tasks_list(Some("completed".to_string()));
        assert!(completed.items.iter().any(|item| item.id == id));

        let updated = task_update(id.clone(), "renamed".to_string(), false);
        assert!(updated.ok, "{}", updated.message);
        assert_eq!(updated.task.expect("updated task").text, "renamed");

        let deleted = task_delete(id.clone());
        assert!(deleted.ok);
        assert_eq!(deleted.message, "Task deleted.");
        let all = tasks_list(None);
        assert!(all.items.iter().all(|item| item.id != id));
    }

    #[test]
    fn missing_ids_are_not_failures() {
        let toggled = task_toggle("no-such-task".to_string());
        assert!(toggled.ok);
        assert!(toggled.task.is_none());

        let deleted = task_delete("no-such-task".to_string());
        assert!(deleted.ok);
        assert_eq!(deleted.message, "Task not found.");
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
