//! Server error types.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use todo_store::TodoStoreError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Malformed request body or path.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Error reported by the todo store.
    #[error(transparent)]
    Store(#[from] TodoStoreError),
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        ServerError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            ServerError::Store(TodoStoreError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "invalid_request")
            }
            ServerError::Store(TodoStoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            ServerError::Store(
                TodoStoreError::StorageUnavailable(_) | TodoStoreError::StorageSetup(_),
            ) => (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use entities::ValidationError;

    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ServerError::InvalidRequest("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServerError::from(TodoStoreError::from(ValidationError::EmptyText)),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServerError::from(TodoStoreError::not_found(1)),
                StatusCode::NOT_FOUND,
            ),
            (
                ServerError::from(TodoStoreError::StorageSetup("pool timed out".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
