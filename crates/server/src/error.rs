//! HTTP error responses for the pricescout server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors a handler can surface to the client.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Core failure; client errors such as `InvalidInput` become 400.
    #[error(transparent)]
    Internal(#[from] pricescout_core::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::Internal(e) if e.is_client_error() => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
            WebError::Internal(e) => {
                tracing::error!(error = %e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
