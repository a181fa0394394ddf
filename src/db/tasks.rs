//! Task CRUD operations.

use super::{Database, StoreError, StoreResult, now_ms};
use crate::types::{Priority, Task, TaskFields, TaskId, TaskPatch};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, params};

const TASK_COLUMNS: &str = "id, title, description, priority, completed, created_at, updated_at";

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let priority: String = row.get("priority")?;
    let priority: Priority = priority
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        priority,
        completed: row.get("completed")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

impl Database {
    /// Insert a new, not yet completed task.
    pub fn insert_task(&self, fields: &TaskFields) -> StoreResult<Task> {
        self.with_conn(|conn| {
            let now = now_ms();
            let task = conn.query_row(
                &format!(
                    "INSERT INTO tasks (title, description, priority, completed, created_at, updated_at)
                     VALUES (?1, ?2, ?3, 0, ?4, ?4)
                     RETURNING {TASK_COLUMNS}"
                ),
                params![fields.title, fields.description, fields.priority.as_str(), now],
                parse_task_row,
            )?;
            Ok(task)
        })
    }

    /// All tasks, most recently created first.
    ///
    /// Ties on `created_at` fall back to id so insertion order is preserved
    /// within the same millisecond.
    pub fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC, id DESC"
            ))?;
            let tasks = stmt
                .query_map([], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Get a task by id.
    pub fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        self.with_conn(|conn| {
            let task = conn
                .query_row(
                    &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                    params![id],
                    parse_task_row,
                )
                .optional()?;
            Ok(task)
        })
    }

    /// Apply a partial update and return the updated task.
    ///
    /// `updated_at` always moves forward, even when two writes land in the
    /// same millisecond.
    pub fn update_task(&self, id: TaskId, patch: &TaskPatch) -> StoreResult<Task> {
        let (set_description, description) = match &patch.description {
            Some(value) => (true, value.clone()),
            None => (false, None),
        };

        self.with_conn(|conn| {
            let task = conn
                .query_row(
                    &format!(
                        "UPDATE tasks SET
                            title = COALESCE(?1, title),
                            description = CASE WHEN ?2 THEN ?3 ELSE description END,
                            priority = COALESCE(?4, priority),
                            completed = COALESCE(?5, completed),
                            updated_at = MAX(?6, updated_at + 1)
                         WHERE id = ?7
                         RETURNING {TASK_COLUMNS}"
                    ),
                    params![
                        patch.title,
                        set_description,
                        description,
                        patch.priority.map(|p| p.as_str()),
                        patch.completed,
                        now_ms(),
                        id
                    ],
                    parse_task_row,
                )
                .optional()?;
            task.ok_or(StoreError::NotFound(id))
        })
    }

    /// Delete a task. Fails if the task does not exist.
    pub fn delete_task(&self, id: TaskId) -> StoreResult<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
            if deleted == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
    }
}
