use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

/// Generic message for failures whose detail must stay server-side.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Required input missing or invalid.
    BadRequest(String),
    /// Resource not found error.
    NotFound(String),
    /// Server-side configuration is missing (e.g. the upstream API key).
    Configuration(String),
    /// Upstream answered with a non-success status; passed through to the caller.
    Upstream {
        /// Status returned by the upstream service.
        status: StatusCode,
        /// Message sent back to the caller.
        message: String,
    },
    /// Transport or decoding failure talking to an external API.
    ExternalApiError(String),
    /// Internal server error.
    InternalError(String),
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Upstream { status, message } => {
                write!(f, "Upstream returned {}: {}", status, message)
            }
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream { status, .. } => *status,
            AppError::Configuration(_)
            | AppError::ExternalApiError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to an appropriate HTTP status code and JSON body.
    /// Logs errors appropriately based on their severity.
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            AppError::BadRequest(msg) | AppError::NotFound(msg) => msg,
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                msg
            }
            AppError::Upstream { status, message } => {
                tracing::error!("Upstream error {}: {}", status, message);
                message
            }
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        };

        (status, Json(ErrorBody { error: error_message })).into_response()
    }
}
