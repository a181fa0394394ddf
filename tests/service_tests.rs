//! Integration tests for the task service.
//!
//! These tests drive the service against an in-memory SQLite database, plus a
//! store stub that fails every call to exercise the persistence error paths.

use async_trait::async_trait;
use std::sync::Arc;
use task_board::db::{Database, StoreError, StoreResult};
use task_board::error::{ErrorCode, ErrorKind};
use task_board::invalidation::{Invalidator, ViewPath};
use task_board::store::TaskStore;
use task_board::types::{Priority, Task, TaskFields, TaskId, TaskInput, TaskPatch};
use task_board::ui::{DeleteState, TaskForm, TaskRow};
use task_board::view::TaskListView;
use task_board::TaskService;

/// Helper to create a service over a fresh in-memory database.
fn setup() -> (TaskService, Database) {
    let db = Database::open_in_memory().expect("Failed to create in-memory database");
    let service = TaskService::new(Arc::new(db.clone()), Invalidator::new());
    (service, db)
}

/// Store whose every call fails, standing in for an unreachable database.
struct FailingStore;

#[async_trait]
impl TaskStore for FailingStore {
    async fn insert(&self, _fields: TaskFields) -> StoreResult<Task> {
        Err(StoreError::Worker("connection refused".into()))
    }

    async fn find_all(&self) -> StoreResult<Vec<Task>> {
        Err(StoreError::Worker("connection refused".into()))
    }

    async fn find_one(&self, _id: TaskId) -> StoreResult<Option<Task>> {
        Err(StoreError::Worker("connection refused".into()))
    }

    async fn update(&self, _id: TaskId, _patch: TaskPatch) -> StoreResult<Task> {
        Err(StoreError::Worker("connection refused".into()))
    }

    async fn delete(&self, _id: TaskId) -> StoreResult<()> {
        Err(StoreError::Worker("connection refused".into()))
    }
}

/// Store that panics on insert, standing in for a bug below the service.
struct PanickingStore;

#[async_trait]
impl TaskStore for PanickingStore {
    async fn insert(&self, _fields: TaskFields) -> StoreResult<Task> {
        panic!("insert blew up");
    }

    async fn find_all(&self) -> StoreResult<Vec<Task>> {
        Ok(Vec::new())
    }

    async fn find_one(&self, _id: TaskId) -> StoreResult<Option<Task>> {
        Ok(None)
    }

    async fn update(&self, id: TaskId, _patch: TaskPatch) -> StoreResult<Task> {
        Err(StoreError::NotFound(id))
    }

    async fn delete(&self, id: TaskId) -> StoreResult<()> {
        Err(StoreError::NotFound(id))
    }
}

fn failing_service() -> TaskService {
    TaskService::new(Arc::new(FailingStore), Invalidator::new())
}

mod create_tests {
    use super::*;

    #[tokio::test]
    async fn create_then_list_includes_exactly_one_new_task() {
        let (svc, _db) = setup();

        for (title, priority, expected) in [
            ("Write report", None, Priority::Medium),
            ("  Padded  ", Some("low"), Priority::Low),
            ("Urgent", Some("high"), Priority::High),
        ] {
            let mut input = TaskInput::new(title);
            if let Some(p) = priority {
                input = input.with_priority(p);
            }
            let created = svc.create(&input).await.unwrap();

            let tasks = svc.list().await;
            let matching: Vec<_> = tasks.iter().filter(|t| t.id == created.id).collect();
            assert_eq!(matching.len(), 1);
            assert_eq!(matching[0].title, title.trim());
            assert!(!matching[0].completed);
            assert_eq!(matching[0].priority, expected);
        }
    }

    #[tokio::test]
    async fn blank_title_is_rejected_without_mutation() {
        let (svc, _db) = setup();
        let existing = svc.create(&TaskInput::new("keep")).await.unwrap();

        for title in ["", " ", "\t\n  "] {
            let err = svc.create(&TaskInput::new(title)).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert_eq!(err.message, "Title is required");

            let err = svc
                .update(existing.id, &TaskInput::new(title))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }

        let tasks = svc.list().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "keep");
        assert_eq!(tasks[0].updated_at, existing.updated_at);
    }

    #[tokio::test]
    async fn blank_title_with_other_fields_leaves_list_empty() {
        let (svc, _db) = setup();

        let input = TaskInput::new("")
            .with_description("desc")
            .with_priority("high");
        let err = svc.create(&input).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::MissingRequiredField);
        assert!(svc.list().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_priority_is_a_validation_error() {
        let (svc, _db) = setup();

        let err = svc
            .create(&TaskInput::new("x").with_priority("urgent"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidFieldValue);
        assert_eq!(err.field.as_deref(), Some("priority"));
        assert!(svc.list().await.is_empty());
    }

    #[tokio::test]
    async fn blank_description_is_stored_as_absent() {
        let (svc, _db) = setup();

        let task = svc
            .create(&TaskInput::new("x").with_description("   "))
            .await
            .unwrap();
        assert!(task.description.is_none());
    }
}

mod list_tests {
    use super::*;

    #[tokio::test]
    async fn list_is_newest_first() {
        let (svc, _db) = setup();

        let t1 = svc.create(&TaskInput::new("first")).await.unwrap();
        let t2 = svc.create(&TaskInput::new("second")).await.unwrap();
        let t3 = svc.create(&TaskInput::new("third")).await.unwrap();

        let ids: Vec<_> = svc.list().await.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![t3.id, t2.id, t1.id]);
    }

    #[tokio::test]
    async fn list_is_empty_when_store_is_unreachable() {
        assert!(failing_service().list().await.is_empty());
    }
}

mod toggle_tests {
    use super::*;

    #[tokio::test]
    async fn toggle_twice_restores_original() {
        let (svc, _db) = setup();
        let task = svc.create(&TaskInput::new("flip")).await.unwrap();

        let once = svc.toggle_complete(task.id).await.unwrap();
        assert!(once.completed);
        assert!(once.updated_at > task.updated_at);

        let twice = svc.toggle_complete(task.id).await.unwrap();
        assert_eq!(twice.completed, task.completed);
        assert_eq!(twice.title, task.title);
    }

    #[tokio::test]
    async fn toggle_and_update_missing_leave_store_unchanged() {
        let (svc, _db) = setup();
        let task = svc.create(&TaskInput::new("only")).await.unwrap();
        let before = svc.list().await;

        let err = svc.toggle_complete(task.id + 100).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = svc
            .update(task.id + 100, &TaskInput::new("ghost"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);

        assert_eq!(svc.list().await, before);
    }
}

mod update_tests {
    use super::*;

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_completion() {
        let (svc, _db) = setup();
        let task = svc
            .create(&TaskInput::new("draft").with_description("old"))
            .await
            .unwrap();
        svc.toggle_complete(task.id).await.unwrap();

        let updated = svc
            .update(task.id, &TaskInput::new("final").with_priority("high"))
            .await
            .unwrap();

        assert_eq!(updated.title, "final");
        assert!(updated.description.is_none());
        assert_eq!(updated.priority, Priority::High);
        assert!(updated.completed);
        assert_eq!(updated.created_at, task.created_at);
    }
}

mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn delete_removes_and_second_delete_errors() {
        let (svc, _db) = setup();
        let keep = svc.create(&TaskInput::new("keep")).await.unwrap();
        let gone = svc.create(&TaskInput::new("gone")).await.unwrap();

        svc.delete(gone.id).await.unwrap();
        let ids: Vec<_> = svc.list().await.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![keep.id]);

        let err = svc.delete(gone.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(err.message, "Failed to delete task");
    }
}

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn store_failures_become_persistence_errors() {
        let svc = failing_service();

        let err = svc.create(&TaskInput::new("x")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(err.message, "Failed to create task");

        let err = svc.toggle_complete(1).await.unwrap_err();
        assert_eq!(err.message, "Failed to toggle task");

        let err = svc.update(1, &TaskInput::new("x")).await.unwrap_err();
        assert_eq!(err.message, "Failed to update task");

        let err = svc.delete(1).await.unwrap_err();
        assert_eq!(err.message, "Failed to delete task");

        assert_eq!(svc.invalidator().generation(ViewPath::TaskList), 0);
    }

    #[tokio::test]
    async fn validation_runs_before_the_store() {
        let err = failing_service()
            .create(&TaskInput::new(" "))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

mod ui_tests {
    use super::*;

    #[tokio::test]
    async fn failed_toggle_rolls_row_back() {
        let (svc, db) = setup();
        let task = svc.create(&TaskInput::new("row")).await.unwrap();
        let mut row = TaskRow::new(task.clone());

        // Remove the task behind the row's back so the toggle fails.
        db.delete_task(task.id).unwrap();

        let before = row.visual().checked;
        row.toggle(&svc).await;

        assert_eq!(row.visual().checked, before);
        assert!(!row.toggle_state().in_flight());
        assert!(row.notice().is_some());
    }

    #[tokio::test]
    async fn successful_toggle_confirms_row() {
        let (svc, _db) = setup();
        let task = svc.create(&TaskInput::new("row")).await.unwrap();
        let mut row = TaskRow::new(task);

        row.toggle(&svc).await;

        assert!(row.visual().checked);
        assert!(row.toggle_state().confirmed());
    }

    #[tokio::test]
    async fn declined_delete_does_nothing() {
        let (svc, _db) = setup();
        let task = svc.create(&TaskInput::new("stay")).await.unwrap();
        let mut row = TaskRow::new(task);

        row.delete(&svc, |_| false).await;

        assert_eq!(row.delete_state(), DeleteState::Idle);
        assert_eq!(svc.list().await.len(), 1);
    }

    #[tokio::test]
    async fn create_form_clears_on_success_and_keeps_values_on_failure() {
        let (svc, _db) = setup();
        let mut form = TaskForm::create();

        let mut refreshed = false;
        let result = form
            .submit(&svc, TaskInput::new("new").with_priority("high"), || {
                refreshed = true
            })
            .await;
        assert!(matches!(result, Some(Ok(_))));
        assert!(refreshed);
        assert!(form.values().title.is_empty());

        let failing = failing_service();
        let result = form
            .submit(&failing, TaskInput::new("retry me"), || {})
            .await;
        assert!(matches!(result, Some(Err(_))));
        assert_eq!(form.values().title, "retry me");
        assert_eq!(form.error(), Some("Failed to create task"));
    }
}

mod unexpected_failure_tests {
    use super::*;

    #[tokio::test]
    async fn panicking_submission_shows_generic_message() {
        let svc = TaskService::new(Arc::new(PanickingStore), Invalidator::new());
        let mut form = TaskForm::create();
        let input = TaskInput::new("doomed")
            .with_description("kept")
            .with_priority("high");

        let mut refreshed = false;
        let result = form.submit(&svc, input.clone(), || refreshed = true).await;

        let err = match result {
            Some(Err(err)) => err,
            other => panic!("expected a failed submission, got {:?}", other),
        };
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(form.error(), Some("Something went wrong"));
        assert_eq!(form.values(), &input);
        assert!(!form.is_submitting());
        assert!(!refreshed);
        assert_eq!(svc.invalidator().generation(ViewPath::TaskList), 0);
    }
}

/// The walkthrough from an empty board to an empty board.
#[tokio::test]
async fn full_lifecycle_scenario() {
    let (svc, _db) = setup();
    let view = TaskListView::new(svc.clone());

    let task = svc.create(&TaskInput::new("Buy milk")).await.unwrap();
    let model = view.render().await;
    assert_eq!(model.pending.len(), 1);
    assert_eq!(model.pending[0].priority, Priority::Medium);

    svc.toggle_complete(task.id).await.unwrap();
    let model = view.render().await;
    assert!(model.pending.is_empty());
    assert_eq!(model.completed[0].id, task.id);

    svc.update(task.id, &TaskInput::new("Buy oat milk"))
        .await
        .unwrap();
    let model = view.render().await;
    assert_eq!(model.completed[0].title, "Buy oat milk");
    assert!(model.completed[0].completed);

    svc.delete(task.id).await.unwrap();
    assert!(view.render().await.is_empty());
}
