// SPDX-License-Identifier: MIT

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// HTTP-boundary error.
///
/// Business-rule violations map to 4xx with a descriptive message; anything
/// unexpected from the storage layer is logged at the handler and converted
/// to a generic 500.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub missing_fields: Option<Vec<&'static str>>,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "missingFields", skip_serializing_if = "Option::is_none")]
    missing_fields: Option<Vec<&'static str>>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            missing_fields: None,
        }
    }

    /// Validation failure with the itemized list of missing field names.
    pub fn missing_fields(message: impl Into<String>, fields: Vec<&'static str>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            missing_fields: Some(fields),
        }
    }

    /// Malformed or missing input.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Duplicate or contradictory state. Rendered as 400, matching the
    /// public API contract (no 409 in the status set).
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            message: self.message,
            missing_fields: self.missing_fields,
        });
        (self.status, body).into_response()
    }
}

impl From<crate::storage::StorageError> for ApiError {
    fn from(err: crate::storage::StorageError) -> Self {
        use crate::storage::StorageError;
        match err {
            StorageError::NotFound(msg) => ApiError::not_found(msg),
            StorageError::AlreadyExists(msg) => ApiError::conflict(msg),
            other => {
                tracing::error!(error = %other, "storage operation failed");
                ApiError::internal("Internal server error")
            }
        }
    }
}
