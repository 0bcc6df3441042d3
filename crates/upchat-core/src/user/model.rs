//! UserProfile domain model.
//!
//! Represents the user's display name and avatar image.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_DISPLAY_NAME;

/// User profile domain model.
///
/// A process-wide singleton persisted independently of sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Name shown next to the user's messages
    pub display_name: String,
    /// Avatar image as a `data:<mime>;base64,...` URI
    pub avatar_image: Option<String>,
}

impl UserProfile {
    pub fn with_display_name(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            avatar_image: None,
        }
    }

    pub fn has_avatar(&self) -> bool {
        self.avatar_image.is_some()
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::with_display_name(DEFAULT_DISPLAY_NAME)
    }
}
