use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_API_BASE_URL: &str = "https://api.claimguide.io";
const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 10;

fn default_data_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".claimflow"),
        None => PathBuf::from(".claimflow"),
    }
}

/// Engine configuration (`config.toml` in the data directory).
///
/// Every field has a default, so a missing file or a file with only some
/// keys is fine. CLI flags and `CLAIMFLOW_*` env vars override these.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory for the store file and logs. Default: `~/.claimflow`.
    pub data_dir: PathBuf,
    /// Remote profile service base URL.
    pub api_base_url: String,
    /// Bearer token for the profile service. None = unauthenticated
    /// (the service will reject writes; reads may still work in dev).
    pub auth_token: Option<String>,
    /// Per-request timeout for profile fetch/push, in seconds. Default: 10.
    /// Gating never waits on this — sync is an overlay, not a dependency.
    pub sync_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_token: None,
            sync_timeout_secs: DEFAULT_SYNC_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Loads `config.toml` from the given path, or returns defaults when
    /// the file does not exist. A file that exists but fails to parse is an
    /// error — unlike the store, a broken config should be fixed, not
    /// silently ignored.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.sync_timeout_secs, DEFAULT_SYNC_TIMEOUT_SECS);
        assert_eq!(config.auth_token, None);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_base_url = \"http://localhost:5000\"\n").unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.sync_timeout_secs, DEFAULT_SYNC_TIMEOUT_SECS);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_base_url = [not toml").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }
}
