//! Unified path management for UP Chat files.
//!
//! Resolves platform directories with the `dirs` crate so every component
//! agrees on where configuration, stored data and logs live.

use std::path::PathBuf;

const APP_DIR: &str = "upchat";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for upchat_core::UpChatError {
    fn from(err: PathError) -> Self {
        upchat_core::UpChatError::config(err.to_string())
    }
}

/// Unified path management for UP Chat.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/upchat/            # Config directory
/// └── config.toml              # Application configuration
///
/// ~/.local/share/upchat/       # Data directory (overridable)
/// ├── store/                   # One file per persistent store key
/// │   ├── chat_history
/// │   ├── active_transcript
/// │   ├── display_name
/// │   └── avatar_image
/// └── logs/                    # Application logs
///     └── upchat.log.YYYY-MM-DD
/// ```
#[derive(Debug, Clone, Default)]
pub struct UpChatPaths {
    data_dir_override: Option<PathBuf>,
}

impl UpChatPaths {
    /// Creates a resolver; `data_dir` replaces the platform data directory.
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        Self {
            data_dir_override: data_dir,
        }
    }

    /// Returns the UP Chat configuration directory (e.g., `~/.config/upchat/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the data directory, honoring the override.
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(dir) = &self.data_dir_override {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the directory backing the persistent key/value store.
    pub fn store_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("store"))
    }

    /// Returns the path to the logs directory.
    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file() {
        let config_file = UpChatPaths::config_file().unwrap();
        assert!(config_file.ends_with("upchat/config.toml"));
    }

    #[test]
    fn test_override_drives_store_and_logs() {
        let paths = UpChatPaths::new(Some(PathBuf::from("/tmp/upchat-test")));
        assert_eq!(paths.data_dir().unwrap(), PathBuf::from("/tmp/upchat-test"));
        assert_eq!(
            paths.store_dir().unwrap(),
            PathBuf::from("/tmp/upchat-test/store")
        );
        assert_eq!(
            paths.logs_dir().unwrap(),
            PathBuf::from("/tmp/upchat-test/logs")
        );
    }

    #[test]
    fn test_default_data_dir() {
        let data_dir = UpChatPaths::default().data_dir().unwrap();
        assert!(data_dir.ends_with("upchat"));
    }
}
