//! Persistence gateway consumed by the task service.
//!
//! The service only sees this trait, so the store handle is constructed once at
//! startup and passed in explicitly. Tests substitute their own implementations
//! to simulate an unreachable store.

use crate::db::{Database, StoreError, StoreResult};
use crate::types::{Task, TaskFields, TaskId, TaskPatch};
use async_trait::async_trait;

/// Create/read/update/delete for tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a task and return it with its assigned id and timestamps.
    async fn insert(&self, fields: TaskFields) -> StoreResult<Task>;

    /// All tasks ordered by creation time, newest first.
    async fn find_all(&self) -> StoreResult<Vec<Task>>;

    async fn find_one(&self, id: TaskId) -> StoreResult<Option<Task>>;

    /// Fails with [`StoreError::NotFound`] if the id is absent.
    async fn update(&self, id: TaskId, patch: TaskPatch) -> StoreResult<Task>;

    /// Fails with [`StoreError::NotFound`] if the id is absent.
    async fn delete(&self, id: TaskId) -> StoreResult<()>;
}

impl Database {
    /// Run a store call on the blocking pool so the async runtime is never
    /// held up by SQLite.
    async fn blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Database) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| StoreError::Worker(e.to_string()))?
    }
}

#[async_trait]
impl TaskStore for Database {
    async fn insert(&self, fields: TaskFields) -> StoreResult<Task> {
        self.blocking(move |db| db.insert_task(&fields)).await
    }

    async fn find_all(&self) -> StoreResult<Vec<Task>> {
        self.blocking(|db| db.list_tasks()).await
    }

    async fn find_one(&self, id: TaskId) -> StoreResult<Option<Task>> {
        self.blocking(move |db| db.get_task(id)).await
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> StoreResult<Task> {
        self.blocking(move |db| db.update_task(id, &patch)).await
    }

    async fn delete(&self, id: TaskId) -> StoreResult<()> {
        self.blocking(move |db| db.delete_task(id)).await
    }
}
