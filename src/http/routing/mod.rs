pub mod tasks;

use axum::{routing::get, Json, Router};
use axum::http::StatusCode;
use serde_json::json;

use crate::http::types::ApiResponse;

pub fn app(router: Router) -> Router {
    Router::new()
        .route("/", get(|| async { Json(json!({ "service": "Task Management API", "version": env!("CARGO_PKG_VERSION") })) }))
        .route("/health", get(|| async { Json(json!({ "status": "healthy", "timestamp": chrono::Utc::now().to_rfc3339() })) }))
        .merge(router)
        .fallback(|| async { (StatusCode::NOT_FOUND, Json(ApiResponse::failure("Endpoint not found"))) })
}
