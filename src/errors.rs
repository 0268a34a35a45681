use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Backend base URL or API key missing from deployment configuration.
    Configuration(String),
    /// Bad request error (invalid input), raised before any backend call.
    BadRequest(String),
    /// The backend answered with a non-2xx status.
    Upstream {
        /// Status code returned by the backend.
        status: u16,
        /// Response body as text.
        body: String,
    },
    /// The backend could not be reached or its response could not be read.
    Network(String),
    /// The backend answered 2xx with a body of the wrong shape.
    InvalidPayload(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// Status code the error maps to when returned from a handler.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            AppError::Network(_) | AppError::InvalidPayload(_) => StatusCode::BAD_GATEWAY,
            AppError::WithContext { source, .. } => source.status_code(),
        }
    }
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Upstream { status, body } => {
                write!(f, "Backend returned {}: {}", status, body)
            }
            AppError::Network(msg) => write!(f, "Backend unreachable: {}", msg),
            AppError::InvalidPayload(msg) => write!(f, "Invalid backend payload: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Every variant produces a `{"error": ...}` JSON body. Backend bodies are
    /// passed through as text so the dashboard can show them in a notification.
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                msg.clone()
            }
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Upstream { status, body } => {
                tracing::warn!("Backend returned {}: {}", status, body);
                body.clone()
            }
            AppError::Network(msg) => {
                tracing::error!("Backend unreachable: {}", msg);
                msg.clone()
            }
            AppError::InvalidPayload(msg) => {
                tracing::error!("Invalid backend payload: {}", msg);
                msg.clone()
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                return (*source.clone()).into_response();
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }
}
