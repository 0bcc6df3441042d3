//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation,
//! including the sender and message content.

use serde::{Deserialize, Serialize};

/// Identifier of a message, unique within one session.
pub type MessageId = i64;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message typed by the user.
    User,
    /// Message produced by the relay (including the welcome and fallback texts).
    Bot,
}

/// A single entry in a transcript.
///
/// Messages are immutable once appended; the only way to change one is to
/// retract it (see [`Transcript::retract`](super::Transcript::retract)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier, increasing in insertion order.
    pub id: MessageId,
    /// The text shown in the bubble.
    pub text: String,
    /// The author of the message.
    pub sender: Sender,
}

impl Message {
    /// Creates a user message.
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::User,
        }
    }

    /// Creates a bot message.
    pub fn bot(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::Bot,
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }
}
