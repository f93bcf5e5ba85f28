use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use cdc_booking::{WorkflowError, WorkflowStep};

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    IllegalTransition {
        message: String,
        current_step: WorkflowStep,
        allowed_transitions: Vec<WorkflowStep>,
    },
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::AuthenticationError(msg) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": msg })))
            }
            AppError::AuthorizationError(msg) => {
                (StatusCode::FORBIDDEN, Json(json!({ "error": msg })))
            }
            AppError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg })))
            }
            AppError::NotFoundError(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg })))
            }
            AppError::ConflictError(msg) => {
                (StatusCode::CONFLICT, Json(json!({ "error": msg })))
            }
            // Carries the legal next steps so a client can render valid
            // options without a second round trip.
            AppError::IllegalTransition {
                message,
                current_step,
                allowed_transitions,
            } => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": message,
                    "currentStep": current_step,
                    "allowedTransitions": allowed_transitions,
                })),
            ),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
            }
        };

        (status, body).into_response()
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::BookingNotFound(id) => {
                AppError::NotFoundError(format!("booking not found: {}", id))
            }
            WorkflowError::RequestNotFound(id) => {
                AppError::NotFoundError(format!("collaboration request not found: {}", id))
            }
            WorkflowError::InvalidArgument(msg) => AppError::ValidationError(msg),
            WorkflowError::IllegalTransition {
                current,
                requested,
                allowed,
            } => AppError::IllegalTransition {
                message: format!("cannot move booking from {} to {}", current, requested),
                current_step: current,
                allowed_transitions: allowed,
            },
            WorkflowError::Conflict { id, expected } => AppError::ConflictError(format!(
                "booking {} was modified concurrently (expected step {})",
                id, expected
            )),
            WorkflowError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}
