//! Upload failure shape for retry classification.

use std::fmt;

/// Error returned by a single chunk send (transport, file IO, or HTTP status).
/// Carries enough context to classify and decide retries before converting to anyhow.
#[derive(Debug)]
pub enum UploadError {
    /// Curl reported an error (timeout, connection, TLS, etc.).
    Curl(curl::Error),
    /// Local file IO failed while reading the chunk.
    Io(std::io::Error),
    /// HTTP response with a non-success status. `final_chunk` is true when the
    /// response answered the last chunk of the file; some servers acknowledge
    /// that chunk with an unconventional status instead of 200/201.
    Http { status: u32, final_chunk: bool },
    /// The server answered with something the wire protocol does not allow
    /// (e.g. an initiate response without a session URI). Never retried.
    Protocol(String),
    /// Upload cancelled by the caller (interrupt); the remote session stays
    /// resumable but is not advanced further.
    Aborted,
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Curl(e) => write!(f, "{}", e),
            UploadError::Io(e) => write!(f, "file IO: {}", e),
            UploadError::Http { status, .. } => write!(f, "HTTP {}", status),
            UploadError::Protocol(msg) => write!(f, "protocol violation: {}", msg),
            UploadError::Aborted => write!(f, "upload aborted"),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UploadError::Curl(e) => Some(e),
            UploadError::Io(e) => Some(e),
            UploadError::Http { .. } | UploadError::Protocol(_) | UploadError::Aborted => None,
        }
    }
}
