use axum::response::{IntoResponse, Response};
use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

use crate::application::error::{Status, TaskError};
use crate::domain::pagination::PageMeta;

/// Envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self { Self { success: true, message: None, data: Some(data), meta: None } }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_meta(mut self, meta: PageMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl ApiResponse<()> {
    pub fn ok(message: impl Into<String>) -> Self { Self { success: true, message: Some(message.into()), data: None, meta: None } }

    pub fn failure(message: impl Into<String>) -> Self { Self { success: false, message: Some(message.into()), data: None, meta: None } }
}

pub fn status_code(status: Status) -> StatusCode {
    match status {
        Status::Ok => StatusCode::OK,
        Status::NotFound => StatusCode::NOT_FOUND,
        Status::InvalidInput => StatusCode::BAD_REQUEST,
        Status::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Successful outcome, mapped through the same classification as failures.
pub fn respond_ok<T: Serialize>(body: ApiResponse<T>) -> Response {
    (status_code(Status::Ok), Json(body)).into_response()
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let message = match &self {
            TaskError::Validation(reason) => format!("Invalid data: {reason}"),
            TaskError::NotFound => "Task not found".to_string(),
            TaskError::Store(e) => {
                tracing::error!(error = %format!("{e:#}"), "store failure");
                "Internal server error".to_string()
            }
        };
        (status_code(self.status()), Json(ApiResponse::failure(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_map_to_status_codes() {
        assert_eq!(respond_ok(ApiResponse::ok("done")).status(), StatusCode::OK);
        assert_eq!(TaskError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(TaskError::Validation("title".into()).into_response().status(), StatusCode::BAD_REQUEST);
        let store = TaskError::Store(anyhow::anyhow!("connection reset"));
        assert_eq!(store.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
