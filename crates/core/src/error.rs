//! Unified error types for pricescout.
//!
//! Display strings carry a stable upper-case code prefix so they can be
//! grepped out of logs regardless of which crate raised them.

/// Unified error type shared by the pipeline, the site adapters and the shells.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., missing query on export).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A composed or configured URL could not be parsed.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Adapter or fetch exceeded its time budget.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetched page exceeded the configured byte limit.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Network failure or non-success HTTP status.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Product extraction failed (bad selector, unparsable page).
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// Headless rendering failed.
    #[error("RENDER_FAILED: {0}")]
    RenderFailed(String),

    /// Export assembly failed.
    #[error("EXPORT_FAILED: {0}")]
    ExportFailed(String),
}

impl Error {
    /// Whether the error was caused by the caller rather than by the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ExportFailed(err.to_string())
    }
}
