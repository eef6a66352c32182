use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of consecutive failed chunk sends before giving up.
    pub max_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 5 }
    }
}

/// Global configuration loaded from `~/.config/geoup/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoupConfig {
    /// Base URL of the mapping-data service REST API.
    pub api_base_url: String,
    /// Chunk size in bytes for resumable uploads. Must be > 0.
    pub chunk_size_bytes: u64,
    /// HTTP statuses that, on the final chunk, mean the upload completed
    /// even though the server did not answer 200/201.
    #[serde(default = "default_quirk_statuses")]
    pub completion_quirk_statuses: Vec<u32>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Extra file-extension to media-type mappings merged into the registry
    /// at startup (extension without the leading dot).
    #[serde(default)]
    pub media_types: BTreeMap<String, String>,
}

fn default_quirk_statuses() -> Vec<u32> {
    vec![204]
}

impl Default for GeoupConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://mapping.example.com/v1".to_string(),
            chunk_size_bytes: 1024 * 1024,
            completion_quirk_statuses: default_quirk_statuses(),
            retry: None,
            media_types: BTreeMap::new(),
        }
    }
}

impl GeoupConfig {
    /// Effective retry budget: `[retry]` section if present, else the default.
    pub fn max_retries(&self) -> u32 {
        self.retry
            .as_ref()
            .map(|r| r.max_retries)
            .unwrap_or_else(|| RetryConfig::default().max_retries)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("geoup")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GeoupConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GeoupConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GeoupConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = GeoupConfig::default();
        assert_eq!(cfg.api_base_url, "https://mapping.example.com/v1");
        assert_eq!(cfg.chunk_size_bytes, 1024 * 1024);
        assert_eq!(cfg.completion_quirk_statuses, vec![204]);
        assert_eq!(cfg.max_retries(), 5);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = GeoupConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: GeoupConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.api_base_url, cfg.api_base_url);
        assert_eq!(parsed.chunk_size_bytes, cfg.chunk_size_bytes);
        assert_eq!(parsed.completion_quirk_statuses, cfg.completion_quirk_statuses);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            api_base_url = "https://maps.internal.test/v2"
            chunk_size_bytes = 262144
        "#;
        let cfg: GeoupConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.api_base_url, "https://maps.internal.test/v2");
        assert_eq!(cfg.chunk_size_bytes, 262144);
        assert!(cfg.retry.is_none());
        assert_eq!(cfg.max_retries(), 5);
        assert_eq!(cfg.completion_quirk_statuses, vec![204]);
    }

    #[test]
    fn config_toml_retry_and_quirks() {
        let toml = r#"
            api_base_url = "https://maps.internal.test/v2"
            chunk_size_bytes = 1048576
            completion_quirk_statuses = [204, 201]

            [retry]
            max_retries = 3
        "#;
        let cfg: GeoupConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.max_retries(), 3);
        assert_eq!(cfg.completion_quirk_statuses, vec![204, 201]);
    }

    #[test]
    fn config_toml_extra_media_types() {
        let toml = r#"
            api_base_url = "https://maps.internal.test/v2"
            chunk_size_bytes = 1048576

            [media_types]
            sid = "image/x-mrsid"
            ecw = "image/x-ecw"
        "#;
        let cfg: GeoupConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.media_types.get("sid").map(String::as_str), Some("image/x-mrsid"));
        assert_eq!(cfg.media_types.get("ecw").map(String::as_str), Some("image/x-ecw"));
    }
}
