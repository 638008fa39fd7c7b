//! Diagnostic logging for the task-list core.
//!
//! # Responsibility
//! - Start rolling file logs once per process.
//! - Format every core event as one parseable `key=value` line.
//!
//! # Invariants
//! - Lines carry ids, counts and statuses; task text is never logged.
//! - Field values never contain raw newlines, and values with spaces are
//!   quoted, so legacy date-string ids stay one field.
//! - A second init with a different level or directory is rejected; the
//!   running logger is never swapped.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Write as _};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "tasklist";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const MAX_FIELD_CHARS: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: &'static str,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn ensure_same(&self, level: &'static str, log_dir: &Path) -> Result<(), String> {
        if self.log_dir.as_path() != log_dir {
            return Err(format!(
                "logging already writes to `{}`; refusing to switch to `{}`",
                self.log_dir.display(),
                log_dir.display()
            ));
        }
        if self.level != level {
            return Err(format!(
                "logging already runs at level `{}`; refusing to switch to `{level}`",
                self.level
            ));
        }
        Ok(())
    }
}

/// Starts file logging at `level` under the absolute directory `log_dir`.
///
/// Repeating the call with the same arguments is a no-op. Never panics.
///
/// # Errors
/// - Unsupported level, empty or relative directory, directory creation or
///   backend failure, or a conflicting earlier init.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let level = normalize_level(level)?;
    let log_dir = normalize_log_dir(log_dir)?;

    if let Some(active) = ACTIVE_LOGGER.get() {
        return active.ensure_same(level, &log_dir);
    }
    let active = ACTIVE_LOGGER.get_or_try_init(|| start_file_logger(level, log_dir.clone()))?;
    active.ensure_same(level, &log_dir)
}

/// Returns `(level, log_dir)` of the running logger, if any.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE_LOGGER
        .get()
        .map(|active| (active.level, active.log_dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Formats `event=<event> module=<module> status=<status>` plus `fields`.
///
/// Values are flattened to one line, capped, and quoted when they contain
/// whitespace, `=` or quotes.
pub fn event_line(
    module: &str,
    event: &str,
    status: &str,
    fields: &[(&str, &dyn Display)],
) -> String {
    let mut line = format!("event={event} module={module} status={status}");
    for (key, value) in fields {
        let _ = write!(line, " {key}={}", field_value(&value.to_string()));
    }
    line
}

fn field_value(raw: &str) -> String {
    let flat: String = raw
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect();
    let mut value: String = flat.chars().take(MAX_FIELD_CHARS).collect();
    if flat.chars().count() > MAX_FIELD_CHARS {
        value.push_str("...");
    }

    let needs_quotes = value.is_empty()
        || value.contains(|ch: char| ch.is_whitespace() || ch == '=' || ch == '"');
    if needs_quotes {
        format!("\"{}\"", value.replace('"', "'"))
    } else {
        value
    }
}

pub(crate) fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let path = Path::new(log_dir.trim());
    if path.as_os_str().is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    if !path.is_absolute() {
        return Err(format!(
            "log_dir must be an absolute path, got `{}`",
            path.display()
        ));
    }
    Ok(path.to_path_buf())
}

fn start_file_logger(level: &'static str, log_dir: PathBuf) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&log_dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            log_dir.display()
        )
    })?;

    let handle = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_file(
            FileSpec::default()
                .directory(&log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook();
    info!(
        "{}",
        event_line(
            "core",
            "logging_start",
            "ok",
            &[
                ("level", &level),
                ("platform", &std::env::consts::OS),
                ("version", &env!("CARGO_PKG_VERSION")),
            ],
        )
    );

    Ok(ActiveLogger {
        level,
        log_dir,
        _handle: handle,
    })
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        // Payload may embed task text; event_line flattens and caps it.
        error!(
            "{}",
            event_line(
                "core",
                "panic_captured",
                "error",
                &[("location", &location), ("payload", &payload)],
            )
        );
        previous(info);
    }));
}
