//! HTTP layer for the taskboard service.
//!
//! Thin handlers, one per store operation: parse the input, make the one
//! persistence call, map the result to a status code. Store errors never
//! cross this boundary raw; they are logged and reported as JSON errors.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use handlebars::Handlebars;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::db::tasks::Tasks;
use crate::libs::task::{NewTask, PositionUpdate, TaskOrder, TaskPatch};

const INDEX_TEMPLATE: &str = "index";

/// Shared state: the single store handle and the page template registry.
#[derive(Clone)]
pub struct AppState {
    tasks: Arc<Mutex<Tasks>>,
    pages: Arc<Handlebars<'static>>,
}

impl AppState {
    pub fn new(tasks: Tasks) -> Result<Self> {
        let mut pages = Handlebars::new();
        pages.register_template_string(INDEX_TEMPLATE, include_str!("../templates/index.hbs"))?;
        Ok(Self {
            tasks: Arc::new(Mutex::new(tasks)),
            pages: Arc::new(pages),
        })
    }
}

/// Build the HTTP router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route("/tasks/reorder", post(reorder_handler))
        .route("/tasks/{id}", put(update_task_handler).delete(delete_task_handler))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn run(state: AppState, addr: &str) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Taskboard listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}

/// Rendered list page. A store error renders the empty list instead of
/// failing the page.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let items = match state.tasks.lock().fetch(TaskOrder::Position, None) {
        Ok(items) => items,
        Err(e) => {
            error!("Failed to fetch tasks for index page: {e:#}");
            Vec::new()
        }
    };
    let body = state
        .pages
        .render(INDEX_TEMPLATE, &json!({ "items": items }))
        .unwrap_or_else(|e| {
            error!("Failed to render index page: {e}");
            String::new()
        });
    Html(body)
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.tasks.lock().count() {
        Ok(task_count) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "task_count": task_count,
            })),
        ),
        Err(e) => {
            error!("Health check failed: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "unhealthy", "error": e.to_string() })),
            )
        }
    }
}

async fn list_tasks_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.tasks.lock().fetch(TaskOrder::Position, None) {
        Ok(tasks) => (StatusCode::OK, Json(json!(tasks))),
        Err(e) => {
            error!("Failed to list tasks: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch tasks" })),
            )
        }
    }
}

async fn create_task_handler(
    State(state): State<AppState>,
    Json(new_task): Json<NewTask>,
) -> (StatusCode, Json<Value>) {
    if new_task.description.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "description must not be empty" })),
        );
    }
    match state.tasks.lock().insert(&new_task) {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))),
        Err(e) => {
            error!("Failed to create task: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to create task" })),
            )
        }
    }
}

async fn update_task_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<TaskPatch>,
) -> (StatusCode, Json<Value>) {
    match state.tasks.lock().update(id, &patch) {
        Ok(true) => (StatusCode::OK, Json(json!({ "message": "Task updated" }))),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Task not found" })),
        ),
        Err(e) => {
            error!("Failed to update task {id}: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to update task" })),
            )
        }
    }
}

async fn delete_task_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    match state.tasks.lock().delete(id) {
        Ok(true) => (StatusCode::OK, Json(json!({ "message": "Task deleted" }))),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Task not found" })),
        ),
        Err(e) => {
            error!("Failed to delete task {id}: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to delete task" })),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReorderRequest {
    #[serde(default)]
    tasks: Vec<PositionUpdate>,
}

async fn reorder_handler(
    State(state): State<AppState>,
    Json(request): Json<ReorderRequest>,
) -> (StatusCode, Json<Value>) {
    match state.tasks.lock().reorder(&request.tasks) {
        Ok(_) => (StatusCode::OK, Json(json!({ "message": "Tasks reordered" }))),
        Err(e) => {
            error!("Failed to reorder tasks: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to reorder tasks" })),
            )
        }
    }
}
