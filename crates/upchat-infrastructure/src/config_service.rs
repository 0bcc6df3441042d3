//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml` (by default
//! `~/.config/upchat/config.toml`) and applies environment overrides.

use crate::paths::UpChatPaths;
use std::path::{Path, PathBuf};
use upchat_core::config::RootConfig;
use upchat_core::error::{Result, UpChatError};

/// Environment variable overriding `relay.endpoint`.
pub const RELAY_URL_ENV: &str = "UPCHAT_RELAY_URL";

/// Loads [`RootConfig`] from a TOML file.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Uses an explicit configuration file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses the default configuration file location.
    pub fn default_location() -> Result<Self> {
        Ok(Self::with_path(UpChatPaths::config_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file and applies environment overrides.
    ///
    /// A missing file yields defaults. A file that exists but does not parse
    /// is an error.
    pub fn load(&self) -> Result<RootConfig> {
        let mut config = self.load_file()?;
        apply_overrides(&mut config, std::env::var(RELAY_URL_ENV).ok());
        Ok(config)
    }

    fn load_file(&self) -> Result<RootConfig> {
        if !self.path.exists() {
            tracing::debug!("No config at {:?}, using defaults", self.path);
            return Ok(RootConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| {
            UpChatError::config(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    /// Writes `config` to the file, creating parent directories.
    pub fn save(&self, config: &RootConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

fn apply_overrides(config: &mut RootConfig, relay_url: Option<String>) {
    if let Some(url) = relay_url.filter(|u| !u.trim().is_empty()) {
        tracing::info!("Relay endpoint overridden by {}", RELAY_URL_ENV);
        config.relay.endpoint = url.trim().to_string();
    }
}
