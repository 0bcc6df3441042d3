//! Persistent key/value store interface.
//!
//! Everything UP Chat persists (session history, the active transcript, the
//! user profile) goes through this trait, so the storage medium is injected
//! rather than assumed.

use crate::error::Result;

/// Well-known store keys.
pub mod keys {
    /// Serialized list of sessions, newest first.
    pub const CHAT_HISTORY: &str = "chat_history";
    /// Snapshot of the transcript currently on screen.
    pub const ACTIVE_TRANSCRIPT: &str = "active_transcript";
    /// User's display name.
    pub const DISPLAY_NAME: &str = "display_name";
    /// User's avatar image as a data URI.
    pub const AVATAR_IMAGE: &str = "avatar_image";
}

/// Durable string-keyed blob storage.
///
/// Writes are synchronous. Callers decide whether a failure is fatal;
/// the session repository and profile service only log them.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value; `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Removes a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Flushes buffered writes, if the backend buffers any.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
