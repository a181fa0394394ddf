//! Task service: validation, persistence and view invalidation.
//!
//! Every operation returns a [`ServiceResult`]; store failures are logged and
//! converted into one of the service error kinds, never propagated raw.

use crate::db::StoreError;
use crate::error::{ServiceError, ServiceResult};
use crate::invalidation::{Invalidator, MutationKind};
use crate::store::TaskStore;
use crate::types::{Task, TaskId, TaskInput, TaskPatch};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Mutation and query layer over a [`TaskStore`].
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    invalidator: Invalidator,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, invalidator: Invalidator) -> Self {
        Self { store, invalidator }
    }

    /// The channel this service publishes invalidations on.
    pub fn invalidator(&self) -> &Invalidator {
        &self.invalidator
    }

    /// Create a task. Title is required; priority defaults to medium.
    pub async fn create(&self, input: &TaskInput) -> ServiceResult<Task> {
        let fields = input.validate()?;

        let task = self.store.insert(fields).await.map_err(|e| {
            error!(error = %e, "Failed to create task");
            ServiceError::persistence("create")
        })?;

        info!(task_id = task.id, priority = %task.priority, "Task created");
        self.invalidator.invalidate(MutationKind::TaskCreated);
        Ok(task)
    }

    /// All tasks, newest first. An unreachable store yields an empty list.
    pub async fn list(&self) -> Vec<Task> {
        match self.store.find_all().await {
            Ok(tasks) => tasks,
            Err(e) => {
                error!(error = %e, "Failed to fetch tasks");
                Vec::new()
            }
        }
    }

    /// Flip a task's completion flag.
    pub async fn toggle_complete(&self, id: TaskId) -> ServiceResult<Task> {
        let current = self
            .store
            .find_one(id)
            .await
            .map_err(|e| {
                error!(task_id = id, error = %e, "Failed to toggle task");
                ServiceError::persistence("toggle")
            })?
            .ok_or_else(|| ServiceError::task_not_found(id))?;

        let task = self
            .store
            .update(id, TaskPatch::completed(!current.completed))
            .await
            .map_err(|e| match e {
                // Deleted between the read and the write.
                StoreError::NotFound(_) => ServiceError::task_not_found(id),
                e => {
                    error!(task_id = id, error = %e, "Failed to toggle task");
                    ServiceError::persistence("toggle")
                }
            })?;

        info!(task_id = id, completed = task.completed, "Task toggled");
        self.invalidator.invalidate(MutationKind::TaskToggled);
        Ok(task)
    }

    /// Overwrite title, description and priority. Completion is untouched.
    ///
    /// A missing task is reported as a persistence failure, like any other
    /// failed write.
    pub async fn update(&self, id: TaskId, input: &TaskInput) -> ServiceResult<Task> {
        let fields = input.validate()?;

        let task = self.store.update(id, fields.into()).await.map_err(|e| {
            match &e {
                StoreError::NotFound(_) => warn!(task_id = id, "Update targeted a missing task"),
                _ => error!(task_id = id, error = %e, "Failed to update task"),
            }
            ServiceError::persistence("update")
        })?;

        info!(task_id = id, "Task updated");
        self.invalidator.invalidate(MutationKind::TaskUpdated);
        Ok(task)
    }

    /// Permanently delete a task. Deleting a missing task is an error.
    pub async fn delete(&self, id: TaskId) -> ServiceResult<()> {
        self.store.delete(id).await.map_err(|e| {
            match &e {
                StoreError::NotFound(_) => warn!(task_id = id, "Delete targeted a missing task"),
                _ => error!(task_id = id, error = %e, "Failed to delete task"),
            }
            ServiceError::persistence("delete")
        })?;

        info!(task_id = id, "Task deleted");
        self.invalidator.invalidate(MutationKind::TaskDeleted);
        Ok(())
    }
}
