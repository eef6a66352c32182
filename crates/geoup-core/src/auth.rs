//! Cached delegated-authorization credentials.
//!
//! The interactive authorization flow (browser consent, token refresh) is
//! performed by an external helper which writes the credential cache file.
//! This module only binds to its output: a JSON file holding the access
//! token, overridable with `GEOUP_ACCESS_TOKEN` for scripted use.

use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides the credential cache file.
pub const TOKEN_ENV_VAR: &str = "GEOUP_ACCESS_TOKEN";

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("no stored credentials at {0}: set GEOUP_ACCESS_TOKEN or run the authorization helper first")]
    Missing(PathBuf),
    #[error("could not read credential cache {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("credential cache {path} is not valid JSON")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("credential cache {0} holds an empty access token")]
    EmptyToken(PathBuf),
}

/// Stored credentials, as written by the external authorization helper.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    /// Present when the helper obtained offline access; unused here.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Credentials {
    /// Load credentials from a cache file.
    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        if !path.exists() {
            return Err(CredentialsError::Missing(path.to_path_buf()));
        }
        let data = fs::read_to_string(path).map_err(|source| CredentialsError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let creds: Credentials =
            serde_json::from_str(&data).map_err(|source| CredentialsError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        if creds.access_token.trim().is_empty() {
            return Err(CredentialsError::EmptyToken(path.to_path_buf()));
        }
        Ok(creds)
    }
}

/// Default location of the credential cache (same XDG state dir as the log).
pub fn credentials_path() -> Result<PathBuf> {
    let dir = xdg::BaseDirectories::with_prefix("geoup")?.get_state_home();
    Ok(dir.join("credentials.json"))
}

/// Resolve the access token: environment override first, then the cache file.
pub fn load_access_token() -> Result<String> {
    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        if !token.trim().is_empty() {
            tracing::debug!("using access token from {}", TOKEN_ENV_VAR);
            return Ok(token);
        }
    }
    let path = credentials_path()?;
    let creds = Credentials::load(&path)?;
    Ok(creds.access_token)
}
