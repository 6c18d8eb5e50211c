use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

const TITLE_MAX_LEN: usize = 200;
const DESCRIPTION_MAX_LEN: usize = 1000;
const MAX_LIMIT: u32 = 100;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub completed: Option<bool>,
    pub search: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Behaviour switches for tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    /// Serve lists as `{ todos, pagination }` instead of `{ data, pagination }`.
    pub legacy_list_shape: bool,
}

/// Todos in insertion order; listed newest first.
pub type Db = Arc<RwLock<Vec<Todo>>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    options: Options,
}

pub fn app() -> Router {
    app_with(Options::default())
}

pub fn app_with(options: Options) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Vec::new())),
        options,
    };
    Router::new()
        .route("/api/v1/todos", get(list_todos).post(create_todo))
        .route(
            "/api/v1/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/api/v1/health", get(health))
        .route("/api/v1/health/readiness", get(readiness))
        .route("/api/v1/health/liveness", get(liveness))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Options::default()).await
}

pub async fn run_with(listener: TcpListener, options: Options) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(options)).await
}

/// Error response in the service's `{ error: { code, message } }` envelope.
pub struct ApiFailure {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiFailure {
    fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "VALIDATION_ERROR",
            message: message.into(),
        }
    }

    fn not_found(id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND",
            message: format!("Todo with id {id} not found"),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = json!({ "error": { "code": self.code, "message": self.message } });
        (self.status, Json(body)).into_response()
    }
}

fn check_title(title: &str) -> Result<String, ApiFailure> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiFailure::validation("Title is required"));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(ApiFailure::validation("Title must be at most 200 characters"));
    }
    Ok(title.to_string())
}

fn check_description(description: &str) -> Result<String, ApiFailure> {
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(ApiFailure::validation(
            "Description must be at most 1000 characters",
        ));
    }
    Ok(description.to_string())
}

fn matches(todo: &Todo, query: &ListQuery) -> bool {
    if let Some(completed) = query.completed {
        if todo.completed != completed {
            return false;
        }
    }
    match query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => true,
        Some(needle) => {
            let needle = needle.to_lowercase();
            todo.title.to_lowercase().contains(&needle)
                || todo
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        }
    }
}

async fn list_todos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(10);
    if page == 0 {
        return Err(ApiFailure::validation("page must be at least 1"));
    }
    if limit == 0 || limit > MAX_LIMIT {
        return Err(ApiFailure::validation("limit must be between 1 and 100"));
    }

    let todos = state.db.read().await;
    let filtered: Vec<&Todo> = todos.iter().rev().filter(|t| matches(t, &query)).collect();
    let total = filtered.len() as u64;
    let total_pages = total.div_ceil(u64::from(limit)) as u32;
    let items: Vec<Todo> = filtered
        .into_iter()
        .skip((u64::from(page - 1) * u64::from(limit)) as usize)
        .take(limit as usize)
        .cloned()
        .collect();
    let pagination = Pagination {
        page,
        limit,
        total,
        total_pages,
        has_next: page < total_pages,
        has_previous: page > 1,
    };
    tracing::debug!(page, limit, total, "listing todos");

    let body = if state.options.legacy_list_shape {
        json!({ "todos": items, "pagination": pagination })
    } else {
        json!({ "data": items, "pagination": pagination })
    };
    Ok(Json(body))
}

async fn create_todo(
    State(state): State<AppState>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), ApiFailure> {
    let title = check_title(&input.title)?;
    let description = input
        .description
        .as_deref()
        .map(check_description)
        .transpose()?;
    let now = Utc::now();
    let todo = Todo {
        id: Uuid::new_v4().to_string(),
        title,
        description,
        completed: false,
        created_at: now,
        updated_at: now,
    };
    state.db.write().await.push(todo.clone());
    tracing::info!(id = %todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiFailure> {
    let todos = state.db.read().await;
    todos
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found(&id))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, ApiFailure> {
    let title = input.title.as_deref().map(check_title).transpose()?;
    let description = input
        .description
        .as_deref()
        .map(check_description)
        .transpose()?;

    let mut todos = state.db.write().await;
    let todo = todos
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| ApiFailure::not_found(&id))?;
    if let Some(title) = title {
        todo.title = title;
    }
    if let Some(description) = description {
        todo.description = Some(description);
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    todo.updated_at = Utc::now().max(todo.created_at);
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    let mut todos = state.db.write().await;
    let index = todos
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| ApiFailure::not_found(&id))?;
    todos.remove(index);
    tracing::info!(%id, "todo deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn health_body(message: &str) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
        "message": message,
    }))
}

async fn health() -> Json<serde_json::Value> {
    health_body("Application is healthy")
}

async fn readiness() -> Json<serde_json::Value> {
    health_body("Application is ready")
}

async fn liveness() -> Json<serde_json::Value> {
    health_body("Application is alive")
}
