//! `geoup upload <file> --asset-id <id>` – resumable upload of one file.

use anyhow::Result;
use geoup_core::api::ApiClient;
use geoup_core::config::GeoupConfig;
use geoup_core::media_types::MediaTypeRegistry;
use geoup_core::retry::{CompletionQuirk, RetryPolicy};
use geoup_core::uploader::{HttpSessionProvider, UploadRequest, Uploader};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub fn run_upload(
    cfg: &GeoupConfig,
    client: &ApiClient,
    file: &Path,
    asset_id: &str,
) -> Result<()> {
    let mut registry = MediaTypeRegistry::new();
    registry.register_all(&cfg.media_types);

    let request = UploadRequest {
        file: file.to_path_buf(),
        asset_id: asset_id.to_string(),
        chunk_size: cfg.chunk_size_bytes,
    };
    let provider = HttpSessionProvider::new(
        client.base_url().clone(),
        client.access_token().to_string(),
    );
    let policy = RetryPolicy {
        max_retries: cfg.max_retries(),
    };
    let quirk = CompletionQuirk::new(cfg.completion_quirk_statuses.clone());

    let abort = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    install_interrupt_abort(Arc::clone(&abort));

    let mut uploader =
        Uploader::new(policy, quirk, std::io::stderr()).with_abort(abort);
    let receipt = uploader.upload(&request, &registry, &provider)?;
    println!(
        "Uploaded {} bytes to asset {} in {:.1}s",
        receipt.bytes_sent,
        asset_id,
        receipt.elapsed.as_secs_f64()
    );
    Ok(())
}

/// Route SIGINT/SIGTERM to the upload's abort token so an interrupt stops
/// the chunk loop (and any backoff sleep) at the next check, leaving the
/// remote session resumable. The handler only performs an atomic store.
#[cfg(unix)]
fn install_interrupt_abort(token: Arc<AtomicBool>) {
    use std::sync::atomic::Ordering;
    use std::sync::OnceLock;

    static ABORT: OnceLock<Arc<AtomicBool>> = OnceLock::new();

    extern "C" fn on_interrupt(_sig: libc::c_int) {
        if let Some(token) = ABORT.get() {
            token.store(true, Ordering::Relaxed);
        }
    }

    if ABORT.set(token).is_ok() {
        let handler = on_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t;
        unsafe {
            libc::signal(libc::SIGINT, handler);
            libc::signal(libc::SIGTERM, handler);
        }
    }
}
