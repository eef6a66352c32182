//! Chunked resumable uploader with bounded full-jitter retry.
//!
//! Drives one file's upload to completion or a terminal failure: send the
//! next chunk, report progress, classify failures, back off and retry
//! transient ones until the consecutive-failure budget runs out. Offset
//! bookkeeping lives in the session; this loop never recomputes offsets.

mod http;
mod progress;
mod session;

pub use http::HttpSessionProvider;
pub use progress::ProgressReport;
pub use session::{ChunkStatus, UploadSession};

use crate::media_types::MediaTypeRegistry;
use crate::retry::{
    classify, CompletionQuirk, ErrorClass, JitterSource, RetryDecision, RetryPolicy,
    ThreadRngJitter, UploadError,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// One requested upload. Immutable once created.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Local file to upload.
    pub file: PathBuf,
    /// Destination asset identifier on the service.
    pub asset_id: String,
    /// Chunk size in bytes; must be positive.
    pub chunk_size: u64,
}

/// Precondition failure, rejected before any session is opened. Never retried.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("chunk size must be positive")]
    ZeroChunkSize,
    #[error("cannot read upload file {0}")]
    Unreadable(PathBuf),
    #[error("upload file {0} is empty")]
    EmptyFile(PathBuf),
    #[error("could not determine media type for {0}; add the extension under [media_types] in config.toml")]
    UnknownMediaType(PathBuf),
}

/// Outcome of request validation: the resolved media type and file size.
#[derive(Debug)]
pub struct ValidatedUpload<'r> {
    pub media_type: &'r str,
    pub file_len: u64,
}

impl UploadRequest {
    /// Check preconditions: positive chunk size, readable non-empty file,
    /// resolvable media type.
    pub fn validate<'r>(
        &self,
        registry: &'r MediaTypeRegistry,
    ) -> Result<ValidatedUpload<'r>, ConfigurationError> {
        if self.chunk_size == 0 {
            return Err(ConfigurationError::ZeroChunkSize);
        }
        let meta = std::fs::metadata(&self.file)
            .map_err(|_| ConfigurationError::Unreadable(self.file.clone()))?;
        if !meta.is_file() {
            return Err(ConfigurationError::Unreadable(self.file.clone()));
        }
        if meta.len() == 0 {
            return Err(ConfigurationError::EmptyFile(self.file.clone()));
        }
        let media_type = registry
            .resolve_path(&self.file)
            .ok_or_else(|| ConfigurationError::UnknownMediaType(self.file.clone()))?;
        Ok(ValidatedUpload {
            media_type,
            file_len: meta.len(),
        })
    }
}

/// Opens resumable sessions against the remote service.
pub trait SessionProvider {
    /// Open a session for `request`'s file with the resolved media type.
    fn open(
        &self,
        request: &UploadRequest,
        media_type: &str,
    ) -> Result<Box<dyn UploadSession>, UploadError>;
}

/// Returned on success; `bytes_sent` equals the file size.
#[derive(Debug, Clone, Copy)]
pub struct UploadReceipt {
    pub bytes_sent: u64,
    pub elapsed: Duration,
}

/// Drives one upload at a time. Independent uploads run on separate threads
/// with separate instances; nothing here is shared.
pub struct Uploader<W: Write> {
    policy: RetryPolicy,
    quirk: CompletionQuirk,
    status: W,
    jitter: Box<dyn JitterSource>,
    abort: Option<Arc<AtomicBool>>,
}

impl<W: Write> Uploader<W> {
    /// New uploader writing human-readable status lines to `status`
    /// (stderr in the CLI).
    pub fn new(policy: RetryPolicy, quirk: CompletionQuirk, status: W) -> Self {
        Self {
            policy,
            quirk,
            status,
            jitter: Box::new(ThreadRngJitter),
            abort: None,
        }
    }

    /// Replace the jitter source (tests pin it for deterministic delays).
    pub fn with_jitter(mut self, jitter: Box<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    /// Attach an abort token, checked before each chunk send and during
    /// backoff sleeps.
    pub fn with_abort(mut self, token: Arc<AtomicBool>) -> Self {
        self.abort = Some(token);
        self
    }

    /// Upload `request`'s file: validate preconditions, open a session,
    /// drive it to completion.
    pub fn upload(
        &mut self,
        request: &UploadRequest,
        registry: &MediaTypeRegistry,
        provider: &dyn SessionProvider,
    ) -> anyhow::Result<UploadReceipt> {
        let validated = request.validate(registry)?;
        let _ = writeln!(self.status, "Uploading file '{}'", request.file.display());
        tracing::info!(
            file = %request.file.display(),
            asset_id = %request.asset_id,
            media_type = validated.media_type,
            bytes = validated.file_len,
            "starting upload"
        );
        let mut session = provider.open(request, validated.media_type)?;
        Ok(self.drive(session.as_mut())?)
    }

    /// The chunk loop. Takes any session implementation so the retry
    /// behavior is exercised against fakes in tests.
    pub fn drive(
        &mut self,
        session: &mut dyn UploadSession,
    ) -> Result<UploadReceipt, UploadError> {
        let start = Instant::now();
        let mut consecutive_failures = 0u32;
        loop {
            if self.aborted() {
                return Err(UploadError::Aborted);
            }
            match session.send_next_chunk() {
                Ok(ChunkStatus::Progress(p)) => {
                    consecutive_failures = 0;
                    let _ = writeln!(self.status, "Upload {}%", p.percent());
                }
                Ok(ChunkStatus::Complete) => {
                    return Ok(self.finish(start, session.bytes_acknowledged()));
                }
                Err(e) => match classify(&e, &self.quirk) {
                    ErrorClass::CompletedQuirk => {
                        // The server acknowledged the final chunk with its
                        // quirk status; the bytes were accepted even though
                        // the session saw no conventional completion.
                        tracing::debug!(error = %e, "final-chunk quirk treated as completion");
                        return Ok(self.finish(start, session.total_bytes()));
                    }
                    ErrorClass::Fatal => {
                        tracing::warn!(error = %e, "upload failed");
                        return Err(e);
                    }
                    ErrorClass::Retryable => {
                        consecutive_failures += 1;
                        let policy = self.policy;
                        match policy.decide(consecutive_failures, self.jitter.as_mut()) {
                            RetryDecision::GiveUp => {
                                let _ = writeln!(
                                    self.status,
                                    "Failed to make progress after {} consecutive errors.",
                                    consecutive_failures
                                );
                                return Err(e);
                            }
                            RetryDecision::RetryAfter(delay) => {
                                let _ = writeln!(
                                    self.status,
                                    "Transient upload error ({}). Sleeping {:.1}s before retry #{}.",
                                    e,
                                    delay.as_secs_f64(),
                                    consecutive_failures
                                );
                                if !sleep_unless_aborted(delay, self.abort.as_deref()) {
                                    return Err(UploadError::Aborted);
                                }
                            }
                        }
                    }
                },
            }
        }
    }

    fn finish(&mut self, start: Instant, bytes_sent: u64) -> UploadReceipt {
        let elapsed = start.elapsed();
        let _ = writeln!(
            self.status,
            "Upload completed in {:.1}s",
            elapsed.as_secs_f64()
        );
        tracing::info!(bytes_sent, elapsed_secs = elapsed.as_secs_f64(), "upload complete");
        UploadReceipt { bytes_sent, elapsed }
    }

    fn aborted(&self) -> bool {
        self.abort
            .as_ref()
            .map(|a| a.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}

/// Cooperative backoff sleep in short slices so an abort request takes
/// effect promptly. Returns false if the abort token fired.
fn sleep_unless_aborted(delay: Duration, abort: Option<&AtomicBool>) -> bool {
    const SLICE: Duration = Duration::from_millis(100);
    let deadline = Instant::now() + delay;
    loop {
        if abort.map(|a| a.load(Ordering::Relaxed)).unwrap_or(false) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep(SLICE.min(deadline - now));
    }
}
