//! Client configuration.
//!
//! Loaded from TOML, either an explicit path or
//! `<config dir>/scenewright/config.toml`, falling back to defaults:
//!
//! ```toml
//! base_url = "http://127.0.0.1:5000/api/"
//! timeout_secs = 120
//! user_agent = "scenewright/0.1.0"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

/// Overrides `base_url` when set.
pub const API_BASE_ENV: &str = "SCENEWRIGHT_API_BASE";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api/";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Whole-request timeout. `None` leaves timing to the backend.
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            user_agent: format!("scenewright/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: ClientConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config {:?}", path))?;
        config.api_base()?;
        info!("Loaded client config from {:?}", path);
        Ok(config)
    }

    /// Default config location for this platform, if one can be resolved.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("scenewright").join("config.toml"))
    }

    /// Load from [`Self::default_path`] when it exists, otherwise defaults.
    pub fn discover() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Apply environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                debug!("Using API base from {}", API_BASE_ENV);
                self.base_url = base;
            }
        }
        self
    }

    /// Parsed base URL, normalized to end in `/` so relative routes join under it.
    pub fn api_base(&self) -> Result<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).with_context(|| format!("Invalid base_url '{}'", self.base_url))
    }
}
