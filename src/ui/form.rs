//! Task form state machine (create and edit modes).

use crate::error::{ErrorKind, GENERIC_FAILURE, ServiceError, ServiceResult};
use crate::service::TaskService;
use crate::types::{Task, TaskId, TaskInput};
use tracing::error;

/// Which operation a submission performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(TaskId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
    /// Inline message shown above the fields.
    Error(String),
}

/// A pending service call produced by [`TaskForm::begin_submit`].
#[derive(Debug, Clone)]
pub struct Submission {
    pub mode: FormMode,
    pub input: TaskInput,
}

impl Submission {
    /// Invoke the service for this submission.
    ///
    /// The call runs as its own task; a panic inside it is reported as an
    /// internal error instead of unwinding into the form.
    pub async fn run(self, service: &TaskService) -> ServiceResult<Task> {
        let service = service.clone();
        let handle = tokio::spawn(async move {
            match self.mode {
                FormMode::Create => service.create(&self.input).await,
                FormMode::Edit(id) => service.update(id, &self.input).await,
            }
        });

        match handle.await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Task form submission failed unexpectedly");
                Err(ServiceError::unexpected())
            }
        }
    }
}

/// Title/description/priority form.
#[derive(Debug, Clone)]
pub struct TaskForm {
    mode: FormMode,
    values: TaskInput,
    state: FormState,
}

impl TaskForm {
    /// Edit mode when a task is supplied, create mode otherwise.
    pub fn new(task: Option<&Task>) -> Self {
        match task {
            Some(task) => Self::edit(task),
            None => Self::create(),
        }
    }

    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            values: Self::blank(),
            state: FormState::Idle,
        }
    }

    /// Edit mode pre-populated from `task`.
    pub fn edit(task: &Task) -> Self {
        Self::with_values(FormMode::Edit(task.id), TaskInput::from_task(task))
    }

    /// A form in `mode` showing `values`, e.g. re-rendering a rejected post.
    pub fn with_values(mode: FormMode, values: TaskInput) -> Self {
        Self {
            mode,
            values,
            state: FormState::Idle,
        }
    }

    fn blank() -> TaskInput {
        TaskInput {
            priority: Some("medium".to_string()),
            ..Default::default()
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn values(&self) -> &TaskInput {
        &self.values
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == FormState::Submitting
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FormState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (&self.state, self.mode) {
            (FormState::Submitting, _) => "Saving...",
            (_, FormMode::Edit(_)) => "Update Task",
            (_, FormMode::Create) => "Add Task",
        }
    }

    /// Start a submission with the entered values.
    ///
    /// Returns `None` while a submission is already in flight, or when the
    /// title is blank (the form moves to the error state without calling the
    /// service).
    pub fn begin_submit(&mut self, input: TaskInput) -> Option<Submission> {
        if self.is_submitting() {
            return None;
        }

        self.values = input;
        if self.values.title.trim().is_empty() {
            self.state = FormState::Error(ServiceError::title_required().message);
            return None;
        }

        self.state = FormState::Submitting;
        Some(Submission {
            mode: self.mode,
            input: self.values.clone(),
        })
    }

    /// Record the outcome of the in-flight submission.
    ///
    /// On success the form returns to idle, create mode clears its fields and
    /// `on_success` is invoked. On failure the message is shown inline and the
    /// entered values are kept. Returns whether the submission succeeded.
    pub fn finish<T>(&mut self, result: &ServiceResult<T>, on_success: impl FnOnce()) -> bool {
        if !self.is_submitting() {
            return false;
        }

        match result {
            Ok(_) => {
                if self.mode == FormMode::Create {
                    self.values = Self::blank();
                }
                self.state = FormState::Idle;
                on_success();
                true
            }
            Err(e) => {
                let message = match e.kind() {
                    ErrorKind::Internal => GENERIC_FAILURE.to_string(),
                    _ => e.message.clone(),
                };
                self.state = FormState::Error(message);
                false
            }
        }
    }

    /// Submit and wait for the result in one step.
    ///
    /// Returns `None` when the submission was suppressed by
    /// [`begin_submit`](Self::begin_submit).
    pub async fn submit(
        &mut self,
        service: &TaskService,
        input: TaskInput,
        on_success: impl FnOnce(),
    ) -> Option<ServiceResult<Task>> {
        let submission = self.begin_submit(input)?;
        let result = submission.run(service).await;
        self.finish(&result, on_success);
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::invalidation::Invalidator;
    use crate::types::Priority;
    use std::sync::Arc;

    fn service() -> TaskService {
        TaskService::new(
            Arc::new(Database::open_in_memory().unwrap()),
            Invalidator::new(),
        )
    }

    fn sample_task() -> Task {
        Task {
            id: 7,
            title: "Buy milk".into(),
            description: Some("oat".into()),
            priority: Priority::High,
            completed: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn mode_follows_task_presence() {
        assert_eq!(TaskForm::new(None).mode(), FormMode::Create);

        let form = TaskForm::new(Some(&sample_task()));
        assert_eq!(form.mode(), FormMode::Edit(7));
        assert_eq!(form.values().title, "Buy milk");
        assert_eq!(form.values().description.as_deref(), Some("oat"));
        assert_eq!(form.values().priority.as_deref(), Some("high"));
        assert_eq!(form.submit_label(), "Update Task");
    }

    #[test]
    fn create_mode_defaults_priority_to_medium() {
        let form = TaskForm::create();
        assert_eq!(form.values().priority.as_deref(), Some("medium"));
        assert_eq!(form.submit_label(), "Add Task");
    }

    #[test]
    fn second_submit_while_submitting_is_ignored() {
        let mut form = TaskForm::create();
        assert!(form.begin_submit(TaskInput::new("a")).is_some());
        assert_eq!(form.submit_label(), "Saving...");
        assert!(form.begin_submit(TaskInput::new("b")).is_none());
        assert_eq!(form.values().title, "a");
    }

    #[test]
    fn blank_title_is_rejected_before_submitting() {
        let mut form = TaskForm::create();
        assert!(form.begin_submit(TaskInput::new("   ")).is_none());
        assert_eq!(form.error(), Some("Title is required"));
    }

    #[test]
    fn error_keeps_values_and_allows_retry() {
        let mut form = TaskForm::create();
        let input = TaskInput::new("a").with_description("d");
        form.begin_submit(input.clone()).unwrap();

        let result: ServiceResult<()> = Err(ServiceError::persistence("create"));
        assert!(!form.finish(&result, || panic!("callback must not run")));
        assert_eq!(form.error(), Some("Failed to create task"));
        assert_eq!(form.values(), &input);

        assert!(form.begin_submit(input).is_some());
    }

    #[test]
    fn internal_errors_show_generic_message() {
        let mut form = TaskForm::create();
        form.begin_submit(TaskInput::new("a")).unwrap();
        let result: ServiceResult<()> = Err(ServiceError::unexpected());
        form.finish(&result, || {});
        assert_eq!(form.error(), Some("Something went wrong"));
    }

    #[test]
    fn create_success_clears_fields_and_calls_back() {
        let mut form = TaskForm::create();
        form.begin_submit(TaskInput::new("a").with_priority("high"))
            .unwrap();

        let mut closed = false;
        assert!(form.finish(&Ok(()), || closed = true));
        assert!(closed);
        assert_eq!(form.state(), &FormState::Idle);
        assert_eq!(form.values().title, "");
        assert_eq!(form.values().priority.as_deref(), Some("medium"));
    }

    #[test]
    fn edit_success_keeps_fields() {
        let mut form = TaskForm::edit(&sample_task());
        form.begin_submit(TaskInput::new("Buy oat milk")).unwrap();

        let mut closed = false;
        form.finish(&Ok(()), || closed = true);
        assert!(closed);
        assert_eq!(form.values().title, "Buy oat milk");
    }

    #[tokio::test]
    async fn submit_creates_through_service() {
        let svc = service();
        let mut form = TaskForm::create();

        let result = form
            .submit(&svc, TaskInput::new("Write tests"), || {})
            .await
            .unwrap();

        assert_eq!(result.unwrap().title, "Write tests");
        assert_eq!(svc.list().await.len(), 1);
    }

    #[tokio::test]
    async fn submit_in_edit_mode_surfaces_persistence_error() {
        let svc = service();
        let mut form = TaskForm::edit(&sample_task());

        let result = form
            .submit(&svc, TaskInput::new("renamed"), || {})
            .await
            .unwrap();

        assert!(result.is_err());
        assert_eq!(form.error(), Some("Failed to update task"));
        assert_eq!(form.values().title, "renamed");
    }
}
