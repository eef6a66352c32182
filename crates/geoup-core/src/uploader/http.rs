//! HTTP binding of the resumable upload session.
//!
//! Wire protocol: an initiate POST announces the file (media type, length)
//! and yields a session URI in the `Location` header; each chunk is a PUT
//! against that URI with a `Content-Range` header. `308` acknowledges a
//! chunk mid-upload and its `Range` header is authoritative for how many
//! bytes the server holds; `200`/`201` acknowledge the whole upload. Any
//! other status is handed to the retry classifier with the final-chunk flag.

use super::progress::ProgressReport;
use super::session::{ChunkStatus, UploadSession};
use super::{SessionProvider, UploadRequest};
use crate::retry::UploadError;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::time::Duration;
use url::Url;

/// Opens resumable upload sessions over HTTP.
pub struct HttpSessionProvider {
    base_url: Url,
    access_token: String,
}

impl HttpSessionProvider {
    /// `base_url` is the service API root (must be an http(s) URL).
    pub fn new(base_url: Url, access_token: String) -> Self {
        Self {
            base_url,
            access_token,
        }
    }

    fn upload_endpoint(&self, request: &UploadRequest) -> Result<Url, UploadError> {
        let filename = request
            .file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin");
        let mut endpoint = self.base_url.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| UploadError::Protocol("API base URL cannot take path segments".into()))?
            .pop_if_empty()
            .push("assets")
            .push(&request.asset_id)
            .push("files");
        endpoint
            .query_pairs_mut()
            .append_pair("uploadType", "resumable")
            .append_pair("filename", filename);
        Ok(endpoint)
    }

    /// Initiate the session: POST the announcement, read the session URI
    /// from the `Location` header.
    fn initiate(
        &self,
        request: &UploadRequest,
        media_type: &str,
        file_len: u64,
    ) -> Result<Url, UploadError> {
        let endpoint = self.upload_endpoint(request)?;

        let mut easy = curl::easy::Easy::new();
        easy.url(endpoint.as_str()).map_err(UploadError::Curl)?;
        easy.post(true).map_err(UploadError::Curl)?;
        easy.post_fields_copy(&[]).map_err(UploadError::Curl)?;
        easy.connect_timeout(Duration::from_secs(15))
            .map_err(UploadError::Curl)?;
        easy.timeout(Duration::from_secs(30))
            .map_err(UploadError::Curl)?;

        let mut list = curl::easy::List::new();
        list.append(&format!("Authorization: Bearer {}", self.access_token))
            .map_err(UploadError::Curl)?;
        list.append(&format!("X-Upload-Content-Type: {}", media_type))
            .map_err(UploadError::Curl)?;
        list.append(&format!("X-Upload-Content-Length: {}", file_len))
            .map_err(UploadError::Curl)?;
        easy.http_headers(list).map_err(UploadError::Curl)?;

        let mut headers: Vec<String> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| {
                    if let Ok(s) = std::str::from_utf8(data) {
                        headers.push(s.trim_end().to_string());
                    }
                    true
                })
                .map_err(UploadError::Curl)?;
            transfer
                .write_function(|data| Ok(data.len()))
                .map_err(UploadError::Curl)?;
            transfer.perform().map_err(UploadError::Curl)?;
        }

        let status = easy.response_code().map_err(UploadError::Curl)? as u32;
        if !(200..300).contains(&status) {
            return Err(UploadError::Http {
                status,
                final_chunk: false,
            });
        }
        let location = header_value(&headers, "location").ok_or_else(|| {
            UploadError::Protocol("initiate response carried no session URI".into())
        })?;
        endpoint
            .join(&location)
            .map_err(|_| UploadError::Protocol(format!("invalid session URI: {location}")))
    }
}

impl SessionProvider for HttpSessionProvider {
    fn open(
        &self,
        request: &UploadRequest,
        media_type: &str,
    ) -> Result<Box<dyn UploadSession>, UploadError> {
        let file = File::open(&request.file).map_err(UploadError::Io)?;
        let total = file.metadata().map_err(UploadError::Io)?.len();
        let session_uri = self.initiate(request, media_type, total)?;
        tracing::debug!(session_uri = %session_uri, total, "resumable session opened");
        Ok(Box::new(HttpUploadSession {
            file,
            session_uri,
            access_token: self.access_token.clone(),
            chunk_size: request.chunk_size,
            total,
            acknowledged: 0,
        }))
    }
}

/// One live resumable upload over HTTP. `acknowledged` is the server's view
/// of how much it holds; a retried chunk restarts from there.
pub struct HttpUploadSession {
    file: File,
    session_uri: Url,
    access_token: String,
    chunk_size: u64,
    total: u64,
    acknowledged: u64,
}

impl UploadSession for HttpUploadSession {
    fn send_next_chunk(&mut self) -> Result<ChunkStatus, UploadError> {
        let start = self.acknowledged;
        if start >= self.total {
            // All bytes acknowledged, yet the server never answered with a
            // completion status for the final chunk.
            return Err(UploadError::Protocol(
                "server acknowledged all bytes without completing the upload".into(),
            ));
        }
        let end = (start + self.chunk_size).min(self.total);
        let final_chunk = end == self.total;

        let mut body = vec![0u8; (end - start) as usize];
        self.file
            .seek(SeekFrom::Start(start))
            .map_err(UploadError::Io)?;
        self.file.read_exact(&mut body).map_err(UploadError::Io)?;

        let content_range = format!("bytes {}-{}/{}", start, end - 1, self.total);
        let response = put_chunk(&self.session_uri, &self.access_token, body, &content_range)?;

        match response.status {
            200 | 201 => {
                self.acknowledged = self.total;
                Ok(ChunkStatus::Complete)
            }
            308 => {
                self.acknowledged = match parse_acknowledged(&response.headers) {
                    Some(acked) => acked,
                    None => {
                        // Servers normally echo a Range header on 308; when
                        // absent, assume the whole chunk landed.
                        tracing::debug!("308 without Range header, assuming chunk accepted");
                        end
                    }
                };
                Ok(ChunkStatus::Progress(ProgressReport::from_bytes(
                    self.acknowledged,
                    self.total,
                )))
            }
            status => Err(UploadError::Http {
                status,
                final_chunk,
            }),
        }
    }

    fn bytes_acknowledged(&self) -> u64 {
        self.acknowledged
    }

    fn total_bytes(&self) -> u64 {
        self.total
    }
}

struct ChunkResponse {
    status: u32,
    headers: Vec<String>,
}

/// PUT one chunk body to the session URI, collecting status and headers.
fn put_chunk(
    session_uri: &Url,
    access_token: &str,
    body: Vec<u8>,
    content_range: &str,
) -> Result<ChunkResponse, UploadError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(session_uri.as_str()).map_err(UploadError::Curl)?;
    easy.upload(true).map_err(UploadError::Curl)?;
    easy.in_filesize(body.len() as u64)
        .map_err(UploadError::Curl)?;
    easy.connect_timeout(Duration::from_secs(30))
        .map_err(UploadError::Curl)?;
    // Prefer low-speed timeout: abort if throughput drops below 1 KiB/s for
    // 60s, so big chunks on slow links aren't killed by a wall-clock limit.
    easy.low_speed_limit(1024).map_err(UploadError::Curl)?;
    easy.low_speed_time(Duration::from_secs(60))
        .map_err(UploadError::Curl)?;
    // Safety net: hard timeout so a completely stuck transfer eventually fails.
    easy.timeout(Duration::from_secs(3600))
        .map_err(UploadError::Curl)?;

    let mut list = curl::easy::List::new();
    list.append(&format!("Authorization: Bearer {}", access_token))
        .map_err(UploadError::Curl)?;
    list.append(&format!("Content-Range: {}", content_range))
        .map_err(UploadError::Curl)?;
    // Chunk PUTs must not wait on a 100-continue round trip.
    list.append("Expect:").map_err(UploadError::Curl)?;
    easy.http_headers(list).map_err(UploadError::Curl)?;

    let mut headers: Vec<String> = Vec::new();
    {
        let mut transfer = easy.transfer();
        let mut cursor = std::io::Cursor::new(body);
        transfer
            .read_function(move |into| Ok(cursor.read(into).unwrap_or(0)))
            .map_err(UploadError::Curl)?;
        transfer
            .header_function(|data| {
                if let Ok(s) = std::str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(UploadError::Curl)?;
        transfer
            .write_function(|data| Ok(data.len()))
            .map_err(UploadError::Curl)?;
        transfer.perform().map_err(UploadError::Curl)?;
    }

    let status = easy.response_code().map_err(UploadError::Curl)? as u32;
    Ok(ChunkResponse { status, headers })
}

/// First value of the named header (case-insensitive), if present.
fn header_value(headers: &[String], name: &str) -> Option<String> {
    for line in headers {
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().eq_ignore_ascii_case(name) {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}

/// Bytes acknowledged by a `Range: bytes=0-{end}` header on a 308 response.
fn parse_acknowledged(headers: &[String]) -> Option<u64> {
    let value = header_value(headers, "range")?;
    let end = value.strip_prefix("bytes=")?.split_once('-')?.1;
    end.trim().parse::<u64>().ok().map(|e| e + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_value_is_case_insensitive() {
        let headers = vec![
            "HTTP/1.1 200 OK".to_string(),
            "LOCATION: /session/abc123".to_string(),
        ];
        assert_eq!(
            header_value(&headers, "location").as_deref(),
            Some("/session/abc123")
        );
        assert_eq!(header_value(&headers, "range"), None);
    }

    #[test]
    fn parse_acknowledged_from_range_header() {
        let headers = vec!["Range: bytes=0-262143".to_string()];
        assert_eq!(parse_acknowledged(&headers), Some(262144));
    }

    #[test]
    fn parse_acknowledged_rejects_malformed() {
        assert_eq!(parse_acknowledged(&["Range: items 0-5".to_string()]), None);
        assert_eq!(parse_acknowledged(&["Range: bytes=0-x".to_string()]), None);
        assert_eq!(parse_acknowledged(&[]), None);
    }

    #[test]
    fn upload_endpoint_carries_type_and_filename() {
        let provider = HttpSessionProvider::new(
            Url::parse("https://maps.example.com/v1").unwrap(),
            "tok".to_string(),
        );
        let request = UploadRequest {
            file: std::path::PathBuf::from("/data/lots.shp"),
            asset_id: "raster-9".to_string(),
            chunk_size: 1024,
        };
        let endpoint = provider.upload_endpoint(&request).unwrap();
        assert_eq!(endpoint.path(), "/v1/assets/raster-9/files");
        let query: Vec<(String, String)> = endpoint
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&("uploadType".to_string(), "resumable".to_string())));
        assert!(query.contains(&("filename".to_string(), "lots.shp".to_string())));
    }
}
