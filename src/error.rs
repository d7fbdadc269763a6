use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::store::StoreError;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Everything the account pipeline can fail with. Handlers return this
/// directly; the `IntoResponse` impl decides what the caller gets to see.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid payload")]
    Validation(Vec<Violation>),

    #[error("an account with this email already exists")]
    DuplicateAccount,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("store error: {0}")]
    Store(#[source] StoreError),

    #[error("internal error: {0}")]
    Internal(#[source] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(violations) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid payload",
                    "violations": violations,
                })),
            )
                .into_response(),
            ApiError::DuplicateAccount | ApiError::InvalidCredentials => {
                let message = self.to_string();
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            // Store and hashing/signing failures carry causes the caller
            // must not see; log them here and answer with a generic 500.
            ApiError::Store(cause) => {
                error!(error = %cause, "store error");
                internal_response()
            }
            ApiError::Internal(cause) => {
                error!(error = %cause, "internal error");
                internal_response()
            }
        }
    }
}

fn internal_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal server error" })),
    )
        .into_response()
}
