use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared::ErrorResponse;
use thiserror::Error;

/// Unified backend error. Each variant maps to an HTTP status and the
/// response body is always `{"error": message}`.
#[derive(Error, Debug)]
pub enum BudgetError {
    /// Input data is invalid. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Resource does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Resource already exists. HTTP 409.
    #[error("{0}")]
    Conflict(String),

    /// Storage backend failure. HTTP 500. Callers see only the generic
    /// message; the underlying error goes to the server log.
    #[error("{message}")]
    Storage {
        message: String,
        #[source]
        source: sqlx::Error,
    },
}

impl BudgetError {
    /// Wrap a storage failure with the public message for one endpoint.
    pub fn storage(message: &str, source: sqlx::Error) -> Self {
        BudgetError::Storage {
            message: message.to_string(),
            source,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            BudgetError::Validation(_) => StatusCode::BAD_REQUEST,
            BudgetError::NotFound(_) => StatusCode::NOT_FOUND,
            BudgetError::Conflict(_) => StatusCode::CONFLICT,
            BudgetError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BudgetError {
    fn into_response(self) -> Response {
        if let BudgetError::Storage { message, source } = &self {
            tracing::error!("{}: {:?}", message, source);
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
