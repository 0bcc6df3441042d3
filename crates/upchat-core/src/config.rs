//! Configuration model (`config.toml`).
//!
//! Every field has a default so a missing file, or a file with only a few
//! keys, still yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default chat-reply endpoint.
pub const DEFAULT_RELAY_ENDPOINT: &str = "https://upchat-backend.onrender.com/chat";
/// Greeting shown at the top of every fresh conversation.
pub const DEFAULT_WELCOME_TEXT: &str = "สวัสดีค่ะ! UP Chat พร้อมคุยค่ะ มีอะไรให้ช่วยไหม?";
/// Bot message appended when the relay cannot be reached.
pub const DEFAULT_FALLBACK_TEXT: &str = "เชื่อมต่อ Server ไม่ได้";
pub const DEFAULT_BOT_NAME: &str = "UP Chat";
pub const DEFAULT_DISPLAY_NAME: &str = "You";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RootConfig {
    #[serde(default)]
    pub relay: RelaySettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub user_profile: UserProfileSettings,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    /// Full URL of the `POST /chat` endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    #[serde(default = "default_welcome_text")]
    pub welcome_text: String,
    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            bot_name: default_bot_name(),
            welcome_text: default_welcome_text(),
            fallback_text: default_fallback_text(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageSettings {
    /// Overrides the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserProfileSettings {
    /// Name used until the user sets one.
    #[serde(default = "default_display_name")]
    pub default_display_name: String,
}

impl Default for UserProfileSettings {
    fn default() -> Self {
        Self {
            default_display_name: default_display_name(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_RELAY_ENDPOINT.to_string()
}

fn default_bot_name() -> String {
    DEFAULT_BOT_NAME.to_string()
}

fn default_welcome_text() -> String {
    DEFAULT_WELCOME_TEXT.to_string()
}

fn default_fallback_text() -> String {
    DEFAULT_FALLBACK_TEXT.to_string()
}

fn default_display_name() -> String {
    DEFAULT_DISPLAY_NAME.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: RootConfig = toml::from_str("").unwrap();
        assert_eq!(config, RootConfig::default());
        assert_eq!(config.relay.endpoint, DEFAULT_RELAY_ENDPOINT);
        assert_eq!(config.chat.fallback_text, DEFAULT_FALLBACK_TEXT);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: RootConfig = toml::from_str(
            r#"
            [chat]
            bot_name = "Helper"

            [storage]
            data_dir = "/tmp/upchat"
            "#,
        )
        .unwrap();
        assert_eq!(config.chat.bot_name, "Helper");
        assert_eq!(config.chat.welcome_text, DEFAULT_WELCOME_TEXT);
        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/tmp/upchat")));
        assert_eq!(config.user_profile.default_display_name, "You");
    }
}
