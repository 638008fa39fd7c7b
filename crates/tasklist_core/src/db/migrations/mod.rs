//! Ordered schema steps for the key-value database.
//!
//! # Invariants
//! - Step versions start at 1 and increase by one.
//! - All pending steps apply in one transaction or not at all.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// `(version, sql)` pairs in apply order.
const STEPS: &[(u32, &str)] = &[(1, include_str!("0001_init.sql"))];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _)| *version)
}

/// Brings the schema up to `latest_version()`.
///
/// Returns how many steps were applied (0 when already current).
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::UnsupportedSchemaVersion { found, supported });
    }

    let pending: Vec<_> = STEPS.iter().filter(|(version, _)| *version > found).collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for (version, sql) in &pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;
    Ok(pending.len())
}
