//! Minimal HTTP/1.1 server speaking the resumable upload protocol for
//! integration tests.
//!
//! Accepts an initiate POST (answers with a session URI in `Location`) and
//! chunk PUTs with `Content-Range` (answers 308 mid-upload, 200 on the
//! final chunk). Options inject 503 failures, a 204 final-chunk quirk, or
//! flat 404 rejection.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Copy, Default)]
pub struct UploadServerOptions {
    /// Respond 503 to this many chunk PUTs before accepting bytes.
    pub fail_first_puts: u32,
    /// Acknowledge the final chunk with 204 instead of 200.
    pub quirk_204_on_final: bool,
    /// Respond 404 to every chunk PUT (terminal client error).
    pub reject_with_404: bool,
}

/// Observable server state for assertions.
#[derive(Debug, Default)]
pub struct UploadServerState {
    pub received: Vec<u8>,
    pub initiates: u32,
    pub chunk_puts: u32,
}

/// Starts a server in a background thread. Returns the API base URL
/// (e.g. "http://127.0.0.1:12345/v1") and a handle to the shared state.
/// The server runs until the process exits.
pub fn start(opts: UploadServerOptions) -> (String, Arc<Mutex<UploadServerState>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(UploadServerState::default()));
    let failures_left = Arc::new(Mutex::new(opts.fail_first_puts));
    let shared = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&shared);
            let failures_left = Arc::clone(&failures_left);
            thread::spawn(move || handle(stream, &state, &failures_left, opts));
        }
    });
    (format!("http://127.0.0.1:{}/v1", port), state)
}

fn handle(
    mut stream: TcpStream,
    state: &Mutex<UploadServerState>,
    failures_left: &Mutex<u32>,
    opts: UploadServerOptions,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(5)));

    let (method, path, headers, body) = match read_request(&mut stream) {
        Some(r) => r,
        None => return,
    };

    if method.eq_ignore_ascii_case("POST") && path.contains("/files") {
        state.lock().unwrap().initiates += 1;
        respond(
            &mut stream,
            "200 OK",
            &["Location: /upload/session-1".to_string()],
        );
        return;
    }

    if method.eq_ignore_ascii_case("PUT") && path.starts_with("/upload/") {
        state.lock().unwrap().chunk_puts += 1;

        if opts.reject_with_404 {
            respond(&mut stream, "404 Not Found", &[]);
            return;
        }

        {
            let mut left = failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                respond(&mut stream, "503 Service Unavailable", &[]);
                return;
            }
        }

        let (_start, end, total) = match content_range(&headers) {
            Some(r) => r,
            None => {
                respond(&mut stream, "400 Bad Request", &[]);
                return;
            }
        };

        let mut st = state.lock().unwrap();
        st.received.extend_from_slice(&body);
        let final_chunk = end + 1 == total;
        if final_chunk {
            let status = if opts.quirk_204_on_final {
                "204 No Content"
            } else {
                "200 OK"
            };
            respond(&mut stream, status, &[]);
        } else {
            let acked = st.received.len() as u64;
            respond(
                &mut stream,
                "308 Resume Incomplete",
                &[format!("Range: bytes=0-{}", acked.saturating_sub(1))],
            );
        }
        return;
    }

    respond(&mut stream, "404 Not Found", &[]);
}

/// Read one request: method, path, header lines, body (per Content-Length).
fn read_request(stream: &mut TcpStream) -> Option<(String, String, Vec<String>, Vec<u8>)> {
    let mut buf: Vec<u8> = Vec::new();
    let mut tmp = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut tmp).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        if buf.len() > 64 * 1024 {
            return None;
        }
    };

    let head = std::str::from_utf8(&buf[..header_end]).ok()?;
    let mut lines = head.split("\r\n");
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();
    let headers: Vec<String> = lines.map(str::to_string).collect();

    let content_length = headers
        .iter()
        .find_map(|h| {
            let (name, value) = h.split_once(':')?;
            if name.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut tmp).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&tmp[..n]);
    }
    body.truncate(content_length);
    Some((method, path, headers, body))
}

/// Parse `Content-Range: bytes {start}-{end}/{total}`.
fn content_range(headers: &[String]) -> Option<(u64, u64, u64)> {
    let value = headers.iter().find_map(|h| {
        let (name, value) = h.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-range") {
            Some(value.trim().to_string())
        } else {
            None
        }
    })?;
    let spec = value.strip_prefix("bytes ")?;
    let (range, total) = spec.split_once('/')?;
    let (start, end) = range.split_once('-')?;
    Some((
        start.trim().parse().ok()?,
        end.trim().parse().ok()?,
        total.trim().parse().ok()?,
    ))
}

fn respond(stream: &mut TcpStream, status: &str, extra_headers: &[String]) {
    let mut response = format!("HTTP/1.1 {}\r\n", status);
    for header in extra_headers {
        response.push_str(header);
        response.push_str("\r\n");
    }
    response.push_str("Content-Length: 0\r\nConnection: close\r\n\r\n");
    let _ = stream.write_all(response.as_bytes());
}
