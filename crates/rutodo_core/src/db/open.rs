//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections are at the latest schema version.

use super::migrations::{apply_migrations, MigrationPolicy};
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a SQLite database file with the default (destructive) policy.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_db_with_policy(path, MigrationPolicy::default())
}

/// Opens a SQLite database file and brings its schema up to date.
///
/// # Side effects
/// - Creates the file when missing.
/// - May drop and recreate tables under [`MigrationPolicy::Destructive`].
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_with_policy(
    path: impl AsRef<Path>,
    policy: MigrationPolicy,
) -> DbResult<Connection> {
    open_with("file", policy, || Connection::open(path))
}

/// Opens an in-memory SQLite database with the default policy.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_db_in_memory_with_policy(MigrationPolicy::default())
}

/// Opens an in-memory SQLite database and creates the latest schema.
pub fn open_db_in_memory_with_policy(policy: MigrationPolicy) -> DbResult<Connection> {
    open_with("memory", policy, Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    policy: MigrationPolicy,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match connect() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, policy) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection, policy: MigrationPolicy) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn, policy)?;
    Ok(())
}
