//! HTTP server implementation for the task board.
//!
//! Plain HTML form posts follow post/redirect/get. Requests carrying
//! `x-requested-with: fetch` get JSON instead, which the page script uses for
//! the optimistic completion toggle.

use axum::{
    Router,
    extract::{Form, Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::render;
use crate::error::{ErrorKind, ServiceError};
use crate::service::TaskService;
use crate::types::{Task, TaskId, TaskInput};
use crate::ui::{FormMode, TaskForm};
use crate::view::TaskListView;

/// Server state shared across handlers.
#[derive(Clone)]
pub struct WebServer {
    service: TaskService,
    view: Arc<TaskListView>,
}

impl WebServer {
    /// Create server state; the list view subscribes to the service's invalidations.
    pub fn new(service: TaskService) -> Self {
        let view = Arc::new(TaskListView::new(service.clone()));
        Self { service, view }
    }

    pub fn service(&self) -> &TaskService {
        &self.service
    }

    pub fn view(&self) -> &TaskListView {
        &self.view
    }
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// JSON body for a successful mutation.
#[derive(Serialize)]
struct MutationResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<Task>,
}

/// JSON body for a failed mutation.
#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a ServiceError,
}

/// Form data for delete requests.
#[derive(Debug, Deserialize)]
struct DeleteForm {
    #[serde(default)]
    confirm: Option<String>,
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("fetch"))
}

fn status_for(err: &ServiceError) -> StatusCode {
    match err.kind() {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Persistence | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn json_error(err: &ServiceError) -> Response {
    (status_for(err), Json(ErrorResponse { error: err })).into_response()
}

fn mutation_ok(headers: &HeaderMap, task: Option<Task>) -> Response {
    if wants_json(headers) {
        Json(MutationResponse {
            success: true,
            task,
        })
        .into_response()
    } else {
        Redirect::to("/").into_response()
    }
}

/// Render the full page around the current task list.
async fn render_page(
    state: &WebServer,
    add_form: &TaskForm,
    edit: Option<&TaskForm>,
    notice: Option<&str>,
) -> String {
    let model = state.view.render().await;

    // An edit form whose task is no longer listed has no row to show its
    // error in, so it goes to the page notice.
    let orphaned_error = edit
        .filter(|f| match f.mode() {
            FormMode::Edit(id) => model.find(id).is_none(),
            FormMode::Create => false,
        })
        .and_then(|f| f.error());

    let list = render::task_list(&model, edit);
    render::page(add_form, &list, notice.or(orphaned_error))
}

/// Page with an error notice, used when a mutation fails outside any form.
async fn error_page(state: &WebServer, err: &ServiceError) -> Response {
    let html = render_page(state, &TaskForm::create(), None, Some(&err.message)).await;
    (status_for(err), Html(html)).into_response()
}

/// Run a form submission, rendering the form's error state on failure.
async fn submit_form(
    state: &WebServer,
    headers: &HeaderMap,
    mut form: TaskForm,
    input: TaskInput,
) -> Response {
    let result = match form.begin_submit(input) {
        Some(submission) => {
            let result = submission.run(&state.service).await;
            form.finish(&result, || {});
            result
        }
        // A fresh form only refuses to submit when the title is blank.
        None => Err(ServiceError::title_required()),
    };

    match result {
        Ok(task) => mutation_ok(headers, Some(task)),
        Err(e) if wants_json(headers) => json_error(&e),
        Err(e) => {
            let html = match form.mode() {
                FormMode::Create => render_page(state, &form, None, None).await,
                FormMode::Edit(_) => {
                    render_page(state, &TaskForm::create(), Some(&form), None).await
                }
            };
            (status_for(&e), Html(html)).into_response()
        }
    }
}

/// Home page.
async fn index(State(state): State<WebServer>) -> Html<String> {
    Html(render_page(&state, &TaskForm::create(), None, None).await)
}

/// Task list fragment only.
async fn task_list_fragment(State(state): State<WebServer>) -> Html<String> {
    let model = state.view.render().await;
    Html(render::task_list(&model, None))
}

/// Handle the add-task form.
async fn create_task(
    State(state): State<WebServer>,
    headers: HeaderMap,
    Form(input): Form<TaskInput>,
) -> Response {
    submit_form(&state, &headers, TaskForm::create(), input).await
}

/// Page with one row switched to edit mode.
async fn edit_task_page(State(state): State<WebServer>, Path(task_id): Path<TaskId>) -> Response {
    let model = state.view.render().await;
    match model.find(task_id) {
        Some(task) => {
            let form = TaskForm::edit(task);
            Html(render_page(&state, &TaskForm::create(), Some(&form), None).await).into_response()
        }
        None => error_page(&state, &ServiceError::task_not_found(task_id)).await,
    }
}

/// Handle the edit form.
async fn update_task(
    State(state): State<WebServer>,
    Path(task_id): Path<TaskId>,
    headers: HeaderMap,
    Form(input): Form<TaskInput>,
) -> Response {
    let form = TaskForm::with_values(FormMode::Edit(task_id), TaskInput::default());
    submit_form(&state, &headers, form, input).await
}

/// Flip a task's completion flag.
async fn toggle_task(
    State(state): State<WebServer>,
    Path(task_id): Path<TaskId>,
    headers: HeaderMap,
) -> Response {
    match state.service.toggle_complete(task_id).await {
        Ok(task) => mutation_ok(&headers, Some(task)),
        Err(e) if wants_json(&headers) => json_error(&e),
        Err(e) => error_page(&state, &e).await,
    }
}

/// Delete a task. The request must carry `confirm=yes`.
async fn delete_task(
    State(state): State<WebServer>,
    Path(task_id): Path<TaskId>,
    headers: HeaderMap,
    Form(form): Form<DeleteForm>,
) -> Response {
    if form.confirm.as_deref() != Some("yes") {
        let err = ServiceError::invalid_value("confirm", "Deletion must be confirmed");
        return if wants_json(&headers) {
            (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: &err })).into_response()
        } else {
            Redirect::to("/").into_response()
        };
    }

    match state.service.delete(task_id).await {
        Ok(()) => mutation_ok(&headers, None),
        Err(e) if wants_json(&headers) => json_error(&e),
        Err(e) => error_page(&state, &e).await,
    }
}

/// All tasks as JSON, newest first.
async fn api_tasks(State(state): State<WebServer>) -> Json<Vec<Task>> {
    Json(state.service.list().await)
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// API root - returns available endpoints.
async fn api_root() -> impl IntoResponse {
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "tasks": "/api/tasks",
        }
    }))
}

/// Build the router with all routes.
pub fn router(service: TaskService) -> Router {
    let state = WebServer::new(service);

    Router::new()
        // Page routes
        .route("/", get(index))
        .route("/fragments/tasks", get(task_list_fragment))
        .route("/tasks", post(create_task))
        .route("/tasks/{task_id}", post(update_task))
        .route("/tasks/{task_id}/edit", get(edit_task_page))
        .route("/tasks/{task_id}/toggle", post(toggle_task))
        .route("/tasks/{task_id}/delete", post(delete_task))
        // API routes
        .route("/api", get(api_root))
        .route("/api/tasks", get(api_tasks))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle for a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            tracing::error!("Server task failed: {}", e);
        }
    }
}

/// Bind `addr` and serve the task board in the background.
pub async fn start_server(service: TaskService, addr: &str) -> anyhow::Result<ServerHandle> {
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Task board listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Task board shutting down");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(ServerHandle {
        addr: bound_addr,
        shutdown_tx,
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }

    #[test]
    fn fetch_header_selects_json() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));
        headers.insert("x-requested-with", "Fetch".parse().unwrap());
        assert!(wants_json(&headers));
    }

    #[test]
    fn error_kinds_map_to_statuses() {
        assert_eq!(
            status_for(&ServiceError::title_required()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&ServiceError::task_not_found(1)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ServiceError::persistence("delete")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
