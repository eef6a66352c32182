//! Classify upload errors into retry policy classes.

use super::error::UploadError;

/// High-level classification of an upload failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transient: transport/IO fault or server-side status (>= 500). Retried
    /// with backoff until the budget runs out.
    Retryable,
    /// Terminal: client-side rejection (< 500, non-quirk) or cancellation.
    /// Surfaced immediately, never retried.
    Fatal,
    /// The server acknowledged the final chunk with an unconventional status
    /// that its protocol treats as end-of-upload. Maps to success.
    CompletedQuirk,
}

/// Statuses that, on the final chunk, mean the upload completed.
///
/// Which statuses count is backend-specific (some services answer the last
/// chunk with 204 instead of 200/201), so the set comes from configuration
/// rather than being hard-coded.
#[derive(Debug, Clone)]
pub struct CompletionQuirk {
    statuses: Vec<u32>,
}

impl Default for CompletionQuirk {
    fn default() -> Self {
        Self { statuses: vec![204] }
    }
}

impl CompletionQuirk {
    pub fn new(statuses: Vec<u32>) -> Self {
        Self { statuses }
    }

    /// True if `status` signals completion when it answers the final chunk.
    pub fn matches(&self, status: u32) -> bool {
        self.statuses.contains(&status)
    }
}

/// Classify an upload error. Pure and total over the failure shapes: every
/// variant maps to exactly one class, so repeated classification of the same
/// error always agrees.
pub fn classify(e: &UploadError, quirk: &CompletionQuirk) -> ErrorClass {
    match e {
        UploadError::Curl(_) | UploadError::Io(_) => ErrorClass::Retryable,
        UploadError::Http {
            status,
            final_chunk,
        } => {
            if *final_chunk && quirk.matches(*status) {
                ErrorClass::CompletedQuirk
            } else if *status >= 500 {
                ErrorClass::Retryable
            } else {
                ErrorClass::Fatal
            }
        }
        UploadError::Protocol(_) | UploadError::Aborted => ErrorClass::Fatal,
    }
}
