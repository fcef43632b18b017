use rutodo_core::db::open_db_in_memory;
use rutodo_core::{
    Settings, SettingsRepository, SortMode, SqliteSettingsRepository, SETTINGS_ROW_ID,
};
use rusqlite::Connection;

fn settings_rows(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM settings;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn missing_row_reads_defaults_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSettingsRepository::new(&conn);

    let settings = repo.get_settings().unwrap();
    assert_eq!(
        settings,
        Settings {
            is_dark_mode: false,
            sort_mode: SortMode::None,
        }
    );
    assert_eq!(settings_rows(&conn), 0);
}

#[test]
fn put_settings_upserts_single_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSettingsRepository::new(&conn);

    repo.put_settings(&Settings {
        is_dark_mode: true,
        sort_mode: SortMode::Category,
    })
    .unwrap();
    repo.put_settings(&Settings {
        is_dark_mode: true,
        sort_mode: SortMode::Completed,
    })
    .unwrap();

    assert_eq!(settings_rows(&conn), 1);
    let loaded = repo.get_settings().unwrap();
    assert!(loaded.is_dark_mode);
    assert_eq!(loaded.sort_mode, SortMode::Completed);

    let (id, sort_by): (i64, String) = conn
        .query_row("SELECT id, sortBy FROM settings;", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(id, SETTINGS_ROW_ID);
    assert_eq!(sort_by, "COMPLETED");
}

#[test]
fn unknown_sort_name_falls_back_to_none() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO settings (id, isDarkMode, sortBy) VALUES (1, 1, 'PRIORITY');",
        [],
    )
    .unwrap();

    let loaded = SqliteSettingsRepository::new(&conn).get_settings().unwrap();
    assert!(loaded.is_dark_mode);
    assert_eq!(loaded.sort_mode, SortMode::None);
}

#[test]
fn settings_serialize_with_storage_names() {
    let json = serde_json::to_value(Settings {
        is_dark_mode: true,
        sort_mode: SortMode::Category,
    })
    .unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "isDarkMode": true, "sortMode": "CATEGORY" })
    );
}
