//! Authenticated JSON client for the mapping-data service REST API.
//!
//! Thin wrapper over curl: bearer auth, JSON bodies, typed errors. Bulk
//! maintenance commands issue simple sequential calls through this client;
//! only the upload core retries, so there is no retry logic here.

pub mod pager;

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base URL {0:?}")]
    BadBaseUrl(String),
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),
    #[error("HTTP {status} from {url}: {snippet}")]
    Status {
        status: u32,
        url: String,
        snippet: String,
    },
    #[error("could not decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Authenticated handle to the service API.
pub struct ApiClient {
    base_url: Url,
    access_token: String,
}

impl ApiClient {
    pub fn new(base_url: &str, access_token: String) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|_| ApiError::BadBaseUrl(base_url.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::BadBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            access_token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Build an endpoint URL from a relative path and query pairs.
    pub fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::BadBaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// GET a JSON document.
    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        let url = self.endpoint(path, query)?;
        self.request("GET", &url, None)
    }

    /// POST a JSON body, returning the JSON response.
    pub fn post(&self, path: &str, query: &[(&str, &str)], body: &Value) -> Result<Value, ApiError> {
        let url = self.endpoint(path, query)?;
        self.request("POST", &url, Some(body))
    }

    /// PATCH a JSON body, returning the JSON response.
    pub fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let url = self.endpoint(path, &[])?;
        self.request("PATCH", &url, Some(body))
    }

    fn request(&self, method: &str, url: &Url, body: Option<&Value>) -> Result<Value, ApiError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.connect_timeout(Duration::from_secs(15))?;
        easy.timeout(Duration::from_secs(120))?;
        match method {
            "GET" => easy.get(true)?,
            "POST" => easy.post(true)?,
            other => easy.custom_request(other)?,
        }

        let mut list = curl::easy::List::new();
        list.append(&format!("Authorization: Bearer {}", self.access_token))?;
        list.append("Content-Type: application/json")?;
        list.append("Expect:")?;
        easy.http_headers(list)?;

        if let Some(body) = body {
            let encoded = body.to_string();
            easy.post_fields_copy(encoded.as_bytes())?;
        }

        let mut response_body: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                response_body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()? as u32;
        tracing::debug!(method, url = %url, status, "API call");
        if !(200..300).contains(&status) {
            return Err(ApiError::Status {
                status,
                url: url.to_string(),
                snippet: snippet(&response_body),
            });
        }
        if response_body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&response_body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// Short, lossy body excerpt for error messages.
fn snippet(body: &[u8]) -> String {
    const MAX: usize = 200;
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.len() <= MAX {
        trimmed.to_string()
    } else {
        let mut end = MAX;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &trimmed[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_path_and_query() {
        let client = ApiClient::new("https://maps.example.com/v1/", "tok".into()).unwrap();
        let url = client
            .endpoint("rasters", &[("projectId", "p1"), ("pageToken", "abc")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://maps.example.com/v1/rasters?projectId=p1&pageToken=abc"
        );
    }

    #[test]
    fn endpoint_handles_nested_path() {
        let client = ApiClient::new("https://maps.example.com/v1", "tok".into()).unwrap();
        let url = client.endpoint("layers/l-9", &[]).unwrap();
        assert_eq!(url.as_str(), "https://maps.example.com/v1/layers/l-9");
    }

    #[test]
    fn endpoint_escapes_query_values() {
        let client = ApiClient::new("https://maps.example.com/v1", "tok".into()).unwrap();
        let url = client
            .endpoint("layers", &[("creatorEmail", "gis team@example.com")])
            .unwrap();
        assert!(url.as_str().contains("creatorEmail=gis+team%40example.com"));
    }

    #[test]
    fn rejects_non_http_base_url() {
        assert!(matches!(
            ApiClient::new("ftp://maps.example.com", "tok".into()),
            Err(ApiError::BadBaseUrl(_))
        ));
        assert!(matches!(
            ApiClient::new("not a url", "tok".into()),
            Err(ApiError::BadBaseUrl(_))
        ));
    }

    #[test]
    fn snippet_truncates_long_bodies() {
        let long = "x".repeat(500);
        let s = snippet(long.as_bytes());
        assert!(s.len() <= 203);
        assert!(s.ends_with("..."));
        assert_eq!(snippet(b"  short  "), "short");
    }
}
