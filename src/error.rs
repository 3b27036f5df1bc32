//! Error types for medrelay.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Fixed body text returned for malformed requests.
pub const INVALID_REQUEST_TEXT: &str = "Invalid request";

/// Result type alias for medrelay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for medrelay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Provider error: {0}")]
    Provider(#[from] crate::recommender::ProviderError),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Provider failures are masked as fallback text in the handler and
        // never reach this conversion; config errors cannot occur mid-request.
        let (status, text) = match &self {
            Error::BadRequest(_) => (StatusCode::BAD_REQUEST, INVALID_REQUEST_TEXT),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };

        let body = serde_json::json!({ "response": text });

        (status, axum::Json(body)).into_response()
    }
}
