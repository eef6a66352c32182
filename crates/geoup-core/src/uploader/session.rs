//! Resumable upload session capability.
//!
//! A session is a server-tracked upload-in-progress: an opaque state machine
//! (open, in progress with N bytes acknowledged, complete) that owns all
//! offset bookkeeping. The uploader only ever asks it to send the next chunk;
//! after a retryable failure the session holds its offset so the same chunk
//! is sent again. Sessions live for one upload call and are never persisted;
//! a restarted process starts over from byte zero.

use super::progress::ProgressReport;
use crate::retry::UploadError;

/// Outcome of one successful chunk send.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChunkStatus {
    /// The server acknowledged the chunk; more remain.
    Progress(ProgressReport),
    /// The server acknowledged the upload as complete.
    Complete,
}

/// One resumable upload, owned exclusively by a single upload call.
pub trait UploadSession {
    /// Send the next pending chunk and return the server's acknowledgement.
    fn send_next_chunk(&mut self) -> Result<ChunkStatus, UploadError>;

    /// Cumulative bytes the server has acknowledged so far.
    fn bytes_acknowledged(&self) -> u64;

    /// Total size of the file this session uploads.
    fn total_bytes(&self) -> u64;
}
