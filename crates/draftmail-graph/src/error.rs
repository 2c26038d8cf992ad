//! Error types for mail API operations.

use reqwest::StatusCode;

/// Result type alias for mail API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Mail API error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No usable access token; the user has to sign in again.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Token acquisition or refresh failed.
    #[error("Token error: {0}")]
    Token(#[from] draftmail_oauth::Error),

    /// The mail API answered with a non-success status.
    #[error("Request failed with status {status}: {body}")]
    RemoteRequest {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A chunk write failed part way through a resumable upload.
    ///
    /// The server-side session is left as is; the attachment must be restarted.
    #[error("Upload stopped after {acknowledged} of {total} bytes: {source}")]
    TransferIncomplete {
        /// Bytes the server acknowledged before the failure.
        acknowledged: u64,
        /// Declared attachment size.
        total: u64,
        /// The failure of the chunk write.
        #[source]
        source: Box<Error>,
    },

    /// Local file or remote URL could not be read.
    #[error("Failed to read {location}: {reason}")]
    SourceRead {
        /// Path or URL of the source.
        location: String,
        /// What went wrong.
        reason: String,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered successfully but the payload was unusable.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Caller supplied an unusable argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Header value could not be encoded.
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Creates a remote request error from a status and raw body.
    #[must_use]
    pub fn remote(status: StatusCode, body: &[u8]) -> Self {
        Self::RemoteRequest {
            status: status.as_u16(),
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// Returns true if the failure calls for a new sign-in.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        match self {
            Self::Authentication(_) => true,
            Self::Token(e) => e.requires_reauthentication(),
            Self::RemoteRequest { status, .. } => *status == 401,
            Self::TransferIncomplete { source, .. } => source.is_authentication(),
            _ => false,
        }
    }

    /// Returns true if repeating the same request may succeed (429 or 5xx).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RemoteRequest { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::TransferIncomplete { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}
