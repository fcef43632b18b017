//! Core data and state layer for the RuTodo list.
//! UI layers consume [`TodoState`] and never touch SQL directly.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod state;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use db::{DbError, MigrationPolicy};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::settings::{Settings, SortMode, SETTINGS_ROW_ID};
pub use model::task::{TaskId, TaskItem};
pub use repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::{RepoError, RepoResult};
pub use state::{PendingWrite, SubscriptionState, TodoState, WriteFailure};
pub use store::{LiveQuery, StoreError, StoreResult, TodoStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
