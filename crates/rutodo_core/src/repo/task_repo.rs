//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/update/delete and list queries over `todo_items`.
//! - Translate a [`SortMode`] into the single conditional ORDER BY.
//!
//! # Invariants
//! - `insert_task` replaces an existing row with the same id.
//! - `update_task` and `delete_task_by_id` on a missing id are no-ops.
//! - Every list has a total order: the sort key, then `title`, then `id`.

use super::{bool_to_int, int_to_bool, RepoError, RepoResult};
use crate::model::settings::SortMode;
use crate::model::task::{TaskId, TaskItem};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    category,
    isDone
FROM todo_items";

// CATEGORY and NONE compare text, COMPLETED compares 0/1 so open tasks come first.
const SORTED_ORDER_SQL: &str = "ORDER BY
    CASE ?1
        WHEN 'CATEGORY' THEN category
        WHEN 'COMPLETED' THEN isDone
        ELSE title
    END ASC,
    title ASC,
    id ASC";

/// Repository interface for task item persistence.
pub trait TaskRepository {
    fn insert_task(&self, task: &TaskItem) -> RepoResult<()>;
    /// Returns whether a row was replaced.
    fn update_task(&self, task: &TaskItem) -> RepoResult<bool>;
    /// Returns whether a row was removed.
    fn delete_task_by_id(&self, id: TaskId) -> RepoResult<bool>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<TaskItem>>;
    fn list_tasks(&self, sort_mode: SortMode) -> RepoResult<Vec<TaskItem>>;
    fn list_tasks_by_category(&self, category: &str) -> RepoResult<Vec<TaskItem>>;
    fn list_tasks_by_completion(&self, is_done: bool) -> RepoResult<Vec<TaskItem>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_tasks(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<TaskItem>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, task: &TaskItem) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO todo_items (
                id,
                title,
                description,
                category,
                isDone
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.description.as_str(),
                task.category.as_str(),
                bool_to_int(task.is_done),
            ],
        )?;

        Ok(())
    }

    fn update_task(&self, task: &TaskItem) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE todo_items
             SET
                title = ?1,
                description = ?2,
                category = ?3,
                isDone = ?4
             WHERE id = ?5;",
            params![
                task.title.as_str(),
                task.description.as_str(),
                task.category.as_str(),
                bool_to_int(task.is_done),
                task.id.to_string(),
            ],
        )?;

        Ok(changed > 0)
    }

    fn delete_task_by_id(&self, id: TaskId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM todo_items WHERE id = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<TaskItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let task = stmt
            .query_row([id.to_string()], |row| Ok(parse_task_row(row)))
            .optional()?;
        task.transpose()
    }

    fn list_tasks(&self, sort_mode: SortMode) -> RepoResult<Vec<TaskItem>> {
        self.query_tasks(
            &format!("{TASK_SELECT_SQL} {SORTED_ORDER_SQL};"),
            [sort_mode.as_str()],
        )
    }

    fn list_tasks_by_category(&self, category: &str) -> RepoResult<Vec<TaskItem>> {
        self.query_tasks(
            &format!("{TASK_SELECT_SQL} WHERE category = ?1 ORDER BY title ASC, id ASC;"),
            [category],
        )
    }

    fn list_tasks_by_completion(&self, is_done: bool) -> RepoResult<Vec<TaskItem>> {
        self.query_tasks(
            &format!("{TASK_SELECT_SQL} WHERE isDone = ?1 ORDER BY title ASC, id ASC;"),
            [bool_to_int(is_done)],
        )
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<TaskItem> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in todo_items.id"))
    })?;

    Ok(TaskItem {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        category: row.get("category")?,
        is_done: int_to_bool(row.get("isDone")?, "todo_items.isDone")?,
    })
}
