//! Settings repository contract and SQLite implementation.
//!
//! # Invariants
//! - Only the row with `id = SETTINGS_ROW_ID` is ever read or written.
//! - Reading never creates the row; absence yields defaults.
//! - An unrecognized `sortBy` decodes to `SortMode::None`.

use super::{bool_to_int, int_to_bool, RepoResult};
use crate::model::settings::{Settings, SortMode, SETTINGS_ROW_ID};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for the singleton settings record.
pub trait SettingsRepository {
    fn get_settings(&self) -> RepoResult<Settings>;
    fn put_settings(&self, settings: &Settings) -> RepoResult<()>;
}

/// SQLite-backed settings repository.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn get_settings(&self) -> RepoResult<Settings> {
        let row = self
            .conn
            .query_row(
                "SELECT isDarkMode, sortBy FROM settings WHERE id = ?1;",
                [SETTINGS_ROW_ID],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        match row {
            Some((dark_mode, sort_by)) => Ok(Settings {
                is_dark_mode: int_to_bool(dark_mode, "settings.isDarkMode")?,
                sort_mode: SortMode::from_stored(&sort_by),
            }),
            None => Ok(Settings::default()),
        }
    }

    fn put_settings(&self, settings: &Settings) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO settings (id, isDarkMode, sortBy) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                isDarkMode = excluded.isDarkMode,
                sortBy = excluded.sortBy;",
            params![
                SETTINGS_ROW_ID,
                bool_to_int(settings.is_dark_mode),
                settings.sort_mode.as_str(),
            ],
        )?;
        Ok(())
    }
}
