//! In-memory session history with write-through persistence.

use chrono::Local;
use std::sync::Arc;
use upchat_core::session::{Session, SessionId};
use upchat_core::store::{KeyValueStore, keys};

/// What an [`SessionRepository::upsert`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new entry was prepended.
    Inserted,
    /// An existing entry got new messages and a refreshed title.
    Updated,
    /// The session no longer holds a user message; its entry was dropped.
    Removed,
    /// The session holds no user message and had no entry; nothing stored.
    Skipped,
}

/// Ordered collection of sessions, newest first.
///
/// Identity is the session id: an upsert never inserts a second entry for an
/// id that is already present, even when titles collide. Every mutation is
/// written through to the store; a failed write is logged and the in-memory
/// collection stays authoritative until the next write succeeds.
pub struct SessionRepository {
    sessions: Vec<Session>,
    store: Arc<dyn KeyValueStore>,
    synced: bool,
}

impl SessionRepository {
    /// Loads history from `store`.
    ///
    /// Absent or unreadable history yields an empty repository.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let sessions = match store.get(keys::CHAT_HISTORY) {
            Ok(Some(bytes)) => decode_history(&bytes),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read chat history, starting empty: {}", e);
                Vec::new()
            }
        };
        tracing::debug!("[SessionRepository] Loaded {} sessions", sessions.len());

        Self {
            sessions,
            store,
            synced: true,
        }
    }

    /// Inserts or updates a session by id.
    ///
    /// An existing entry keeps its position; its messages are replaced and
    /// its title re-derived at the current local time. A new entry is
    /// prepended. A session without any user message is never stored.
    pub fn upsert(&mut self, session: Session) -> UpsertOutcome {
        let position = self.sessions.iter().position(|s| s.id == session.id);

        let outcome = match (position, session.has_user_message()) {
            (Some(index), true) => {
                self.sessions[index].refresh(session.messages, Local::now());
                UpsertOutcome::Updated
            }
            (None, true) => {
                self.sessions.insert(0, session);
                UpsertOutcome::Inserted
            }
            (Some(index), false) => {
                self.sessions.remove(index);
                UpsertOutcome::Removed
            }
            (None, false) => return UpsertOutcome::Skipped,
        };

        self.persist();
        outcome
    }

    /// Removes the session `id`; returns whether an entry was removed.
    pub fn delete(&mut self, id: SessionId) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        let removed = self.sessions.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Removes every session.
    pub fn clear(&mut self) {
        self.sessions.clear();
        self.persist();
    }

    /// Iterates sessions newest first. The iterator can be cloned to restart.
    pub fn list(&self) -> std::slice::Iter<'_, Session> {
        self.sessions.iter()
    }

    pub fn find(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Largest stored id, used to seed id minting.
    pub fn latest_id(&self) -> Option<SessionId> {
        self.sessions.iter().map(|s| s.id).max()
    }

    /// False while the last write to the store failed.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Serializes the whole collection to the store.
    pub fn persist(&mut self) -> bool {
        let result = serde_json::to_vec(&self.sessions)
            .map_err(upchat_core::UpChatError::from)
            .and_then(|bytes| self.store.set(keys::CHAT_HISTORY, &bytes));

        match result {
            Ok(()) => {
                if !self.synced {
                    tracing::info!("[SessionRepository] Chat history re-synced to store");
                }
                self.synced = true;
            }
            Err(e) => {
                tracing::warn!(
                    "[SessionRepository] Failed to persist {} sessions, keeping them in memory: {}",
                    self.sessions.len(),
                    e
                );
                self.synced = false;
            }
        }
        self.synced
    }
}

/// Parses stored history; malformed data counts as no history.
///
/// Duplicate ids in damaged data collapse to their first (newest) entry.
fn decode_history(bytes: &[u8]) -> Vec<Session> {
    let sessions: Vec<Session> = match serde_json::from_slice(bytes) {
        Ok(sessions) => sessions,
        Err(e) => {
            tracing::warn!("Stored chat history is malformed, ignoring it: {}", e);
            return Vec::new();
        }
    };

    let mut seen = std::collections::HashSet::new();
    sessions.into_iter().filter(|s| seen.insert(s.id)).collect()
}
