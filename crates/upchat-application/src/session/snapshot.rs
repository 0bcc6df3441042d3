//! Persisted copy of the active conversation.
//!
//! Written after every transcript change so a restart resumes the same
//! conversation, including one the history does not hold yet.

use serde::{Deserialize, Serialize};
use upchat_core::session::{Message, SessionId};
use upchat_core::store::{KeyValueStore, keys};

use super::controller::ConversationPhase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ActiveSnapshot {
    pub session_id: SessionId,
    pub phase: ConversationPhase,
    pub messages: Vec<Message>,
}

impl ActiveSnapshot {
    /// Reads the snapshot; an unreadable one is treated as absent.
    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        let bytes = match store.get(keys::ACTIVE_TRANSCRIPT) {
            Ok(bytes) => bytes?,
            Err(e) => {
                tracing::warn!("[ActiveSnapshot] Failed to read active transcript: {}", e);
                return None;
            }
        };

        match serde_json::from_slice::<Self>(&bytes) {
            Ok(snapshot) if !snapshot.messages.is_empty() => Some(snapshot),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("[ActiveSnapshot] Ignoring malformed active transcript: {}", e);
                None
            }
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        let result = serde_json::to_vec(self)
            .map_err(upchat_core::UpChatError::from)
            .and_then(|bytes| store.set(keys::ACTIVE_TRANSCRIPT, &bytes));
        if let Err(e) = result {
            tracing::warn!(
                "[ActiveSnapshot] Failed to persist active transcript for session {}: {}",
                self.session_id,
                e
            );
        }
    }
}
