use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum::http::StatusCode;

use crate::application::error::TaskError;
use crate::application::task_service::TaskService;
use crate::domain::filter::TaskQuery;
use crate::domain::task::{CreateTask, TaskId, UpdateTask};
use crate::http::auth::{AuthUser, Authenticator};
use crate::http::types::{respond_ok, ApiResponse};

#[derive(Clone)]
pub struct AppState<S: TaskService> {
    pub service: S,
    pub auth: Arc<dyn Authenticator>,
}

impl<S: TaskService + Clone> FromRef<AppState<S>> for Arc<dyn Authenticator> {
    fn from_ref(state: &AppState<S>) -> Self { state.auth.clone() }
}

pub fn router<S: TaskService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks::<S>).post(create_task::<S>))
        .route("/tasks/stats/summary", get(task_stats::<S>))
        .route("/tasks/:id", get(get_task::<S>).put(update_task::<S>).delete(delete_task::<S>))
        .with_state(state)
}

type HandlerResult<T> = Result<T, TaskError>;

async fn list_tasks<S: TaskService + Clone>(
    State(state): State<AppState<S>>,
    AuthUser(user): AuthUser,
    Query(pairs): Query<Vec<(String, String)>>,
) -> HandlerResult<Response> {
    let page = state.service.list(&user, &TaskQuery::from_pairs(pairs)).await?;
    Ok(respond_ok(ApiResponse::data(page.items).with_meta(page.meta)))
}

async fn create_task<S: TaskService + Clone>(
    State(state): State<AppState<S>>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CreateTask>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_body(rejection),
    };
    match state.service.create(&user, payload).await {
        Ok(task) => (StatusCode::CREATED, Json(ApiResponse::data(task).with_message("Task created"))).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn get_task<S: TaskService + Clone>(
    State(state): State<AppState<S>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> HandlerResult<Response> {
    let task = state.service.get(&user, parse_id(&id)?).await?;
    Ok(respond_ok(ApiResponse::data(task)))
}

async fn update_task<S: TaskService + Clone>(
    State(state): State<AppState<S>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTask>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => return bad_body(rejection),
    };
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    match state.service.update(&user, id, payload).await {
        Ok(task) => respond_ok(ApiResponse::data(task).with_message("Task updated")),
        Err(e) => e.into_response(),
    }
}

async fn delete_task<S: TaskService + Clone>(
    State(state): State<AppState<S>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> HandlerResult<Response> {
    state.service.delete(&user, parse_id(&id)?).await?;
    Ok(respond_ok(ApiResponse::ok("Task deleted")))
}

async fn task_stats<S: TaskService + Clone>(
    State(state): State<AppState<S>>,
    AuthUser(user): AuthUser,
) -> HandlerResult<Response> {
    let stats = state.service.stats(&user).await?;
    Ok(respond_ok(ApiResponse::data(stats)))
}

// A malformed id can't name an existing task.
fn parse_id(s: &str) -> Result<TaskId, TaskError> { s.parse().map_err(|_| TaskError::NotFound) }

fn bad_body(rejection: JsonRejection) -> Response {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::failure(format!("Invalid data: {}", rejection.body_text())))).into_response()
}
