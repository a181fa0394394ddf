//! Per-task row: optimistic completion toggle, edit mode and delete.
//!
//! This is the reference model for row behavior. The server renders rows from
//! it, and the script in `web/templates/page.html` repeats the same toggle
//! (flip, settle or revert) and delete (confirm, busy) transitions in the
//! browser.

use super::form::TaskForm;
use crate::error::ServiceResult;
use crate::service::TaskService;
use crate::types::{Task, TaskId, TaskInput};
use tracing::warn;

/// Text of the confirmation prompt shown before deleting.
pub const CONFIRM_DELETE_PROMPT: &str = "Are you sure you want to delete this task?";

/// Optimistic completion flag.
///
/// `optimistic` is what the row displays; `confirmed` is the last value the
/// service acknowledged. At most one toggle is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleState {
    confirmed: bool,
    optimistic: bool,
    in_flight: bool,
}

impl ToggleState {
    pub fn new(completed: bool) -> Self {
        Self {
            confirmed: completed,
            optimistic: completed,
            in_flight: false,
        }
    }

    /// Value the row displays.
    pub fn displayed(&self) -> bool {
        self.optimistic
    }

    pub fn confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Flip the displayed value. Returns `false` (and changes nothing) while a
    /// previous toggle is still in flight.
    pub fn begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.optimistic = !self.optimistic;
        self.in_flight = true;
        true
    }

    /// Settle the in-flight toggle. Failure reverts to the confirmed value.
    pub fn settle(&mut self, succeeded: bool) {
        if !self.in_flight {
            return;
        }
        if succeeded {
            self.confirmed = self.optimistic;
        } else {
            self.optimistic = self.confirmed;
        }
        self.in_flight = false;
    }
}

/// Delete flow: confirm first, then a single in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteState {
    Idle,
    AwaitingConfirmation,
    Deleting,
    Deleted,
}

/// Styling flags derived from the displayed completion value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowVisual {
    pub checked: bool,
    pub strikethrough: bool,
    pub dimmed: bool,
}

/// Interactive state of one task row.
#[derive(Debug, Clone)]
pub struct TaskRow {
    task: Task,
    toggle: ToggleState,
    edit_form: Option<TaskForm>,
    delete: DeleteState,
    notice: Option<String>,
}

impl TaskRow {
    pub fn new(task: Task) -> Self {
        Self {
            toggle: ToggleState::new(task.completed),
            task,
            edit_form: None,
            delete: DeleteState::Idle,
            notice: None,
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn id(&self) -> TaskId {
        self.task.id
    }

    pub fn toggle_state(&self) -> ToggleState {
        self.toggle
    }

    /// Styling always follows the optimistic value.
    pub fn visual(&self) -> RowVisual {
        let done = self.toggle.displayed();
        RowVisual {
            checked: done,
            strikethrough: done,
            dimmed: done,
        }
    }

    /// Last failure reported for this row, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    // Completion toggle

    /// Start an optimistic toggle; `None` while one is already in flight.
    pub fn begin_toggle(&mut self) -> Option<TaskId> {
        if !self.toggle.begin() {
            return None;
        }
        self.notice = None;
        Some(self.task.id)
    }

    pub fn finish_toggle(&mut self, result: &ServiceResult<Task>) {
        match result {
            Ok(task) => {
                self.toggle.settle(true);
                self.task.completed = task.completed;
                self.task.updated_at = task.updated_at;
            }
            Err(e) => {
                warn!(task_id = self.task.id, error = %e, "Toggle failed, reverting");
                self.toggle.settle(false);
                self.notice = Some(e.message.clone());
            }
        }
    }

    /// Toggle through the service. Returns `false` if the toggle was ignored.
    pub async fn toggle(&mut self, service: &TaskService) -> bool {
        let Some(id) = self.begin_toggle() else {
            return false;
        };
        let result = service.toggle_complete(id).await;
        self.finish_toggle(&result);
        true
    }

    // Edit mode

    pub fn is_editing(&self) -> bool {
        self.edit_form.is_some()
    }

    /// Switch into edit mode with a form pre-filled from this task.
    pub fn start_edit(&mut self) {
        self.edit_form = Some(TaskForm::edit(&self.task));
    }

    /// Show the edit form with specific values (e.g. a rejected submission).
    pub fn edit_with(&mut self, form: TaskForm) {
        self.edit_form = Some(form);
    }

    pub fn cancel_edit(&mut self) {
        self.edit_form = None;
    }

    pub fn edit_form(&self) -> Option<&TaskForm> {
        self.edit_form.as_ref()
    }

    /// Submit the edit form. A successful save leaves edit mode.
    pub async fn submit_edit(
        &mut self,
        service: &TaskService,
        input: TaskInput,
    ) -> Option<ServiceResult<Task>> {
        let form = self.edit_form.as_mut()?;
        let submission = form.begin_submit(input)?;
        let result = submission.run(service).await;

        let mut close = false;
        form.finish(&result, || close = true);
        if close {
            self.edit_form = None;
        }
        if let Ok(task) = &result {
            self.task = task.clone();
        }
        Some(result)
    }

    // Delete

    pub fn delete_state(&self) -> DeleteState {
        self.delete
    }

    pub fn is_deleting(&self) -> bool {
        self.delete == DeleteState::Deleting
    }

    /// Ask for confirmation. Ignored while a delete is pending or done.
    pub fn request_delete(&mut self) -> bool {
        if self.delete != DeleteState::Idle {
            return false;
        }
        self.delete = DeleteState::AwaitingConfirmation;
        true
    }

    /// Answer the confirmation prompt. Returns the id to delete when confirmed.
    pub fn confirm_delete(&mut self, confirmed: bool) -> Option<TaskId> {
        if self.delete != DeleteState::AwaitingConfirmation {
            return None;
        }
        if confirmed {
            self.delete = DeleteState::Deleting;
            self.notice = None;
            Some(self.task.id)
        } else {
            self.delete = DeleteState::Idle;
            None
        }
    }

    pub fn finish_delete(&mut self, result: &ServiceResult<()>) {
        if self.delete != DeleteState::Deleting {
            return;
        }
        match result {
            Ok(()) => self.delete = DeleteState::Deleted,
            Err(e) => {
                self.delete = DeleteState::Idle;
                self.notice = Some(e.message.clone());
            }
        }
    }

    /// Run the full delete flow, asking `confirm` with [`CONFIRM_DELETE_PROMPT`].
    ///
    /// Returns `None` when the request was ignored or declined.
    pub async fn delete(
        &mut self,
        service: &TaskService,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Option<ServiceResult<()>> {
        if !self.request_delete() {
            return None;
        }
        let id = self.confirm_delete(confirm(CONFIRM_DELETE_PROMPT))?;
        let result = service.delete(id).await;
        self.finish_delete(&result);
        Some(result)
    }
}
