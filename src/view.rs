//! Task list view model.
//!
//! Fetches the task list through the service and splits it into pending and
//! completed groups. A rendered snapshot is reused until the service publishes
//! an invalidation for the list view.

use crate::invalidation::{ViewPath, ViewSubscription};
use crate::service::TaskService;
use crate::types::{Task, TaskId};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Tasks grouped for display, each group in `list()` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListModel {
    pub pending: Vec<Task>,
    pub completed: Vec<Task>,
}

impl TaskListModel {
    /// Split tasks by completion, keeping relative order within each group.
    pub fn partition(tasks: Vec<Task>) -> Self {
        let (completed, pending) = tasks.into_iter().partition(|t| t.completed);
        Self { pending, completed }
    }

    /// True when there are no tasks at all; drives the empty state.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.completed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.pending.len() + self.completed.len()
    }

    /// Look up a task in either group.
    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.pending
            .iter()
            .chain(&self.completed)
            .find(|t| t.id == id)
    }
}

struct ViewState {
    subscription: ViewSubscription,
    snapshot: Option<Arc<TaskListModel>>,
}

/// Renders the task list, re-fetching only after an invalidation.
pub struct TaskListView {
    service: TaskService,
    state: Mutex<ViewState>,
}

impl TaskListView {
    pub fn new(service: TaskService) -> Self {
        let subscription = service.invalidator().subscribe(ViewPath::TaskList);
        Self {
            service,
            state: Mutex::new(ViewState {
                subscription,
                snapshot: None,
            }),
        }
    }

    pub fn service(&self) -> &TaskService {
        &self.service
    }

    /// Current task list model.
    pub async fn render(&self) -> Arc<TaskListModel> {
        let mut state = self.state.lock().await;

        if let Some(snapshot) = &state.snapshot {
            if !state.subscription.is_stale() {
                return Arc::clone(snapshot);
            }
        }

        // Acknowledge before fetching so a mutation racing the fetch leaves
        // the view stale for the next render.
        let generation = state.subscription.mark_seen();
        let model = Arc::new(TaskListModel::partition(self.service.list().await));
        debug!(generation, tasks = model.total(), "Task list fetched");

        // Empty snapshots are not kept: list() is also empty when the store
        // is unreachable.
        state.snapshot = if model.is_empty() {
            None
        } else {
            Some(Arc::clone(&model))
        };
        model
    }
}
