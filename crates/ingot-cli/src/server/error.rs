//! API error types and handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ingot::IngotError;
use serde::Serialize;
use tracing::error;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or invalid request.
    BadRequest(String),
    /// No owner identity on the request.
    Unauthorized(String),
    /// Error from the ingot library.
    Ingot(IngotError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Ingot(e) => match e {
                IngotError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                IngotError::SchemaCreation { .. } => (StatusCode::CONFLICT, "schema_creation"),
                IngotError::Load { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "load_failed"),
                e if e.is_user_error() => (StatusCode::BAD_REQUEST, "invalid_upload"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let message = match self {
            ApiError::BadRequest(msg) | ApiError::Unauthorized(msg) => msg,
            // Storage details stay in the log.
            ApiError::Ingot(_) if status.is_server_error() => "Internal server error".to_string(),
            ApiError::Ingot(e) => e.to_string(),
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<IngotError> for ApiError {
    fn from(err: IngotError) -> Self {
        ApiError::Ingot(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Ingot(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: IngotError) -> StatusCode {
        ApiError::from(err).status().0
    }

    #[test]
    fn test_user_errors_are_client_errors() {
        assert_eq!(
            status_of(IngotError::InvalidTableName("..".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(IngotError::InvalidOwner(String::new())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(IngotError::Load {
                row_index: 3,
                rows_inserted: 3,
                message: "bad integer".to_string(),
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(IngotError::NotFound("t1".to_string())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_storage_errors_are_server_errors() {
        assert_eq!(
            status_of(IngotError::Catalog("disk full".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(IngotError::InconsistentState {
                physical_name: "user_x_t".to_string(),
                message: "drop failed".to_string(),
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
