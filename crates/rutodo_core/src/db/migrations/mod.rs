//! Schema registry and executor.
//!
//! # Responsibility
//! - Create the latest schema on a fresh database.
//! - Decide what happens when an older or newer schema is found.
//!
//! # Invariants
//! - Applied schema version is mirrored to `PRAGMA user_version`.
//! - Schema creation and destructive resets run inside one transaction.
//!
//! Only full-schema scripts are registered; there are no incremental steps
//! between versions. Version 1 was the legacy layout holding `todo_items`
//! alone.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

const SCHEMA_VERSION: u32 = 2;
const SCHEMA_SQL: &str = include_str!("0002_init.sql");
const RESET_SQL: &str = include_str!("reset.sql");

/// What to do when the stored schema is older than this binary's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MigrationPolicy {
    /// Drop both tables and recreate them. All stored rows are lost.
    #[default]
    Destructive,
    /// Refuse to open with [`DbError::MissingMigrationPath`].
    Strict,
}

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    SCHEMA_VERSION
}

/// Brings the connection to [`latest_version`] according to `policy`.
pub fn apply_migrations(conn: &mut Connection, policy: MigrationPolicy) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    if current_version != 0 {
        if policy == MigrationPolicy::Strict {
            return Err(DbError::MissingMigrationPath {
                db_version: current_version,
                latest_supported: latest,
            });
        }
        warn!(
            "event=db_migrate module=db status=reset from_version={} to_version={}",
            current_version, latest
        );
    }

    let tx = conn.transaction()?;
    if current_version != 0 {
        tx.execute_batch(RESET_SQL)?;
    }
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {latest};"))?;
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        current_version, latest
    );
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
