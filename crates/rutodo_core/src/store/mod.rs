//! Async data access layer with a change feed.
//!
//! # Responsibility
//! - Own the one SQLite connection of an application instance.
//! - Run repository calls off the async executor (`spawn_blocking`).
//! - Notify live queries after every write that changed stored data.
//!
//! # Invariants
//! - The change revision is bumped while the connection lock is still
//!   held, so revision order matches commit order.
//! - A failed write never bumps the revision.
//! - Handles are explicitly constructed and cloned; there is no global store.

use crate::config::CoreConfig;
use crate::db::{open_db_in_memory_with_policy, open_db_with_policy, DbResult, MigrationPolicy};
use crate::model::settings::{Settings, SortMode};
use crate::model::task::{TaskId, TaskItem};
use crate::repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::{RepoError, RepoResult};
use log::{debug, error};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

mod live;

pub use live::LiveQuery;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure surfaced by the async data access layer.
#[derive(Debug)]
pub enum StoreError {
    /// Storage or decoding failure from the repository layer.
    Repo(RepoError),
    /// The blocking worker panicked or was cancelled.
    Worker(String),
    /// A previous operation panicked while holding the connection.
    Poisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Worker(message) => write!(f, "store worker failed: {message}"),
            Self::Poisoned => write!(f, "store connection lock is poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Worker(_) | Self::Poisoned => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Cloneable handle over the embedded to-do database.
#[derive(Clone)]
pub struct TodoStore {
    inner: Arc<StoreInner>,
}

pub(crate) struct StoreInner {
    conn: Mutex<Connection>,
    changes: watch::Sender<u64>,
}

impl StoreInner {
    pub(crate) fn read<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&Connection) -> RepoResult<T>,
    ) -> StoreResult<T> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&conn).map_err(|err| {
            error!("event=store_read module=store status=error op={op} error={err}");
            StoreError::Repo(err)
        })
    }

    fn write(
        &self,
        op: &'static str,
        f: impl FnOnce(&Connection) -> RepoResult<bool>,
    ) -> StoreResult<bool> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let changed = f(&conn).map_err(|err| {
            error!("event=store_write module=store status=error op={op} error={err}");
            StoreError::Repo(err)
        })?;

        if changed {
            self.changes.send_modify(|revision| *revision += 1);
        }
        debug!(
            "event=store_write module=store status=ok op={} changed={} revision={}",
            op,
            changed,
            *self.changes.borrow()
        );
        Ok(changed)
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

impl TodoStore {
    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(StoreInner {
                conn: Mutex::new(conn),
                changes,
            }),
        }
    }

    /// Opens the database described by `config`.
    ///
    /// `db_path = None` opens a private in-memory database.
    pub fn open(config: &CoreConfig) -> DbResult<Self> {
        let policy = config.migration_policy();
        let conn = match config.db_path.as_deref() {
            Some(path) => open_db_with_policy(path, policy)?,
            None => open_db_in_memory_with_policy(policy)?,
        };
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> DbResult<Self> {
        let conn = open_db_in_memory_with_policy(MigrationPolicy::default())?;
        Ok(Self::from_connection(conn))
    }

    /// Number of data-changing writes observed so far.
    pub fn revision(&self) -> u64 {
        *self.inner.changes.borrow()
    }

    /// Inserts `task`, replacing any row that shares its id.
    pub async fn insert_task(&self, task: TaskItem) -> StoreResult<()> {
        self.write("insert_task", move |conn| {
            SqliteTaskRepository::new(conn).insert_task(&task)?;
            Ok(true)
        })
        .await?;
        Ok(())
    }

    /// Replaces the stored record with the same id. Returns `false` when absent.
    pub async fn update_task(&self, task: TaskItem) -> StoreResult<bool> {
        self.write("update_task", move |conn| {
            SqliteTaskRepository::new(conn).update_task(&task)
        })
        .await
    }

    /// Removes a task. Returns `false` when absent.
    pub async fn delete_task_by_id(&self, id: TaskId) -> StoreResult<bool> {
        self.write("delete_task", move |conn| {
            SqliteTaskRepository::new(conn).delete_task_by_id(id)
        })
        .await
    }

    pub async fn get_task(&self, id: TaskId) -> StoreResult<Option<TaskItem>> {
        self.read("get_task", move |conn| {
            SqliteTaskRepository::new(conn).get_task(id)
        })
        .await
    }

    pub async fn list_tasks(&self, sort_mode: SortMode) -> StoreResult<Vec<TaskItem>> {
        self.read("list_tasks", move |conn| {
            SqliteTaskRepository::new(conn).list_tasks(sort_mode)
        })
        .await
    }

    pub async fn list_tasks_by_category(
        &self,
        category: impl Into<String>,
    ) -> StoreResult<Vec<TaskItem>> {
        let category = category.into();
        self.read("list_tasks_by_category", move |conn| {
            SqliteTaskRepository::new(conn).list_tasks_by_category(&category)
        })
        .await
    }

    pub async fn list_tasks_by_completion(&self, is_done: bool) -> StoreResult<Vec<TaskItem>> {
        self.read("list_tasks_by_completion", move |conn| {
            SqliteTaskRepository::new(conn).list_tasks_by_completion(is_done)
        })
        .await
    }

    /// Returns stored settings, or defaults without writing a row.
    pub async fn get_settings(&self) -> StoreResult<Settings> {
        self.read("get_settings", |conn| {
            SqliteSettingsRepository::new(conn).get_settings()
        })
        .await
    }

    /// Upserts the singleton settings row.
    pub async fn put_settings(&self, settings: Settings) -> StoreResult<()> {
        self.write("put_settings", move |conn| {
            SqliteSettingsRepository::new(conn).put_settings(&settings)?;
            Ok(true)
        })
        .await?;
        Ok(())
    }

    /// Live task list in the given order.
    pub fn watch_tasks(&self, sort_mode: SortMode) -> LiveQuery<Vec<TaskItem>> {
        LiveQuery::new(Arc::clone(&self.inner), "watch_tasks", move |conn| {
            SqliteTaskRepository::new(conn).list_tasks(sort_mode)
        })
    }

    pub fn watch_tasks_by_category(&self, category: impl Into<String>) -> LiveQuery<Vec<TaskItem>> {
        let category = category.into();
        LiveQuery::new(
            Arc::clone(&self.inner),
            "watch_tasks_by_category",
            move |conn| SqliteTaskRepository::new(conn).list_tasks_by_category(&category),
        )
    }

    pub fn watch_tasks_by_completion(&self, is_done: bool) -> LiveQuery<Vec<TaskItem>> {
        LiveQuery::new(
            Arc::clone(&self.inner),
            "watch_tasks_by_completion",
            move |conn| SqliteTaskRepository::new(conn).list_tasks_by_completion(is_done),
        )
    }

    pub fn watch_settings(&self) -> LiveQuery<Settings> {
        LiveQuery::new(Arc::clone(&self.inner), "watch_settings", |conn| {
            SqliteSettingsRepository::new(conn).get_settings()
        })
    }

    async fn read<T, F>(&self, op: &'static str, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> RepoResult<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        join_worker(tokio::task::spawn_blocking(move || inner.read(op, f)).await)
    }

    async fn write<F>(&self, op: &'static str, f: F) -> StoreResult<bool>
    where
        F: FnOnce(&Connection) -> RepoResult<bool> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        join_worker(tokio::task::spawn_blocking(move || inner.write(op, f)).await)
    }
}

pub(crate) fn join_worker<T>(
    joined: Result<StoreResult<T>, tokio::task::JoinError>,
) -> StoreResult<T> {
    joined.map_err(|err| StoreError::Worker(err.to_string()))?
}
