//! API error types with structured JSON responses.
//!
//! Every error renders as `{"error": {"code": ..., "message": ...}}` so
//! clients can branch on `code` without parsing prose.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::lifecycle::LifecycleError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Lifecycle(LifecycleError::Database(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::Lifecycle(err) => match err {
                LifecycleError::InvalidTransition { .. } => {
                    (StatusCode::CONFLICT, "INVALID_TRANSITION", err.to_string())
                }
                LifecycleError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
                }
                LifecycleError::InsufficientStock { .. } => {
                    (StatusCode::CONFLICT, "INSUFFICIENT_STOCK", err.to_string())
                }
                LifecycleError::ProfileIncomplete { .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "PROFILE_INCOMPLETE",
                    err.to_string(),
                ),
                LifecycleError::Validation(detail) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION", detail.clone())
                }
                LifecycleError::Forbidden => (
                    StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "Not allowed for this role".to_string(),
                ),
                LifecycleError::Database(DatabaseError::NotFound { entity_type, id }) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity_type} not found: {id}"),
                ),
                LifecycleError::Database(e) => {
                    tracing::error!("API internal error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL",
                        "An internal error occurred".to_string(),
                    )
                }
            },
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}
