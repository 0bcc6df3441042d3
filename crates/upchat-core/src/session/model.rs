//! Session domain model.
//!
//! A `Session` is one persisted conversation: a stable identifier, a derived
//! title and the ordered messages.

use super::message::{Message, Sender};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Identifier of a session (creation time in Unix milliseconds).
pub type SessionId = i64;

/// Title used when a transcript carries no user text yet.
pub const UNTITLED_SESSION: &str = "แชทใหม่";

/// A persisted conversation.
///
/// Titles are cosmetic and may collide: two sessions opened with the same
/// question get the same base title and differ only by the time suffix.
/// Identity is always `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: SessionId,
    /// Human-readable title, `"<first user text> (HH:MM)"`
    pub title: String,
    /// Messages in insertion order
    pub messages: Vec<Message>,
}

impl Session {
    /// Builds a session from a transcript, deriving its title at `now`.
    pub fn from_messages(id: SessionId, messages: Vec<Message>, now: DateTime<Local>) -> Self {
        let title = derive_title(&messages, now);
        Self {
            id,
            title,
            messages,
        }
    }

    /// Replaces the messages and re-derives the title at `now`.
    pub fn refresh(&mut self, messages: Vec<Message>, now: DateTime<Local>) {
        self.title = derive_title(&messages, now);
        self.messages = messages;
    }

    /// The first user text, or the untitled placeholder.
    pub fn base_title(&self) -> &str {
        base_title(&self.messages)
    }

    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(|m| m.sender == Sender::User)
    }
}

/// Returns the trimmed text of the first user message, or [`UNTITLED_SESSION`].
pub fn base_title(messages: &[Message]) -> &str {
    messages
        .iter()
        .find(|m| m.sender == Sender::User)
        .map(|m| m.text.trim())
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED_SESSION)
}

/// Derives a display title: base text plus local `HH:MM`.
pub fn derive_title(messages: &[Message], now: DateTime<Local>) -> String {
    format!("{} ({})", base_title(messages), now.format("%H:%M"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 14, h, m, 0).unwrap()
    }

    #[test]
    fn test_title_uses_first_user_message() {
        let messages = vec![
            Message::bot(1, "welcome"),
            Message::user(2, "  ค่าเทอมเท่าไหร่  "),
            Message::bot(3, "reply"),
            Message::user(4, "second question"),
        ];
        let session = Session::from_messages(10, messages, at(9, 5));
        assert_eq!(session.title, "ค่าเทอมเท่าไหร่ (09:05)");
        assert_eq!(session.base_title(), "ค่าเทอมเท่าไหร่");
    }

    #[test]
    fn test_title_without_user_message_is_placeholder() {
        let session = Session::from_messages(10, vec![Message::bot(1, "welcome")], at(23, 59));
        assert_eq!(session.title, format!("{} (23:59)", UNTITLED_SESSION));
        assert!(!session.has_user_message());
    }

    #[test]
    fn test_refresh_recomputes_timestamp() {
        let mut session =
            Session::from_messages(10, vec![Message::user(2, "hello")], at(8, 0));
        session.refresh(
            vec![Message::user(2, "hello"), Message::bot(3, "hi")],
            at(8, 30),
        );
        assert_eq!(session.title, "hello (08:30)");
        assert_eq!(session.messages.len(), 2);
    }
}
