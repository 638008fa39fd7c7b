//! Connection bootstrap for file and in-memory databases.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use crate::logging::event_line;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the database file at `path` with a current schema.
///
/// # Side effects
/// - Emits `db_open` events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with("file", || {
        Connection::open(path).map_err(|source| DbError::Open {
            path: path.to_path_buf(),
            source,
        })
    })
}

/// Opens an empty in-memory database with a current schema.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", || Connection::open_in_memory().map_err(DbError::from))
}

fn open_with(
    mode: &'static str,
    open: impl FnOnce() -> DbResult<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = open().and_then(|mut conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let applied = apply_migrations(&mut conn)?;
        Ok((conn, applied))
    });
    let duration_ms = started_at.elapsed().as_millis();

    match result {
        Ok((conn, applied)) => {
            info!(
                "{}",
                event_line(
                    "db",
                    "db_open",
                    "ok",
                    &[
                        ("mode", &mode),
                        ("duration_ms", &duration_ms),
                        ("migrations_applied", &applied),
                    ],
                )
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "{}",
                event_line(
                    "db",
                    "db_open",
                    "error",
                    &[
                        ("mode", &mode),
                        ("duration_ms", &duration_ms),
                        ("error", &err),
                    ],
                )
            );
            Err(err)
        }
    }
}
