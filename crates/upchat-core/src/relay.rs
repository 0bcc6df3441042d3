//! Chat relay interface.
//!
//! The relay forwards one utterance to the NLU backend and returns its
//! fulfillment text and intent name. The controller only sees this trait.

use crate::session::SessionId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// A successful relay answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayReply {
    /// Fulfillment text to show as the bot message.
    pub text: String,
    /// Name of the intent the NLU matched.
    #[serde(default)]
    pub intent: String,
}

/// Why a relay call produced no reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The request never completed (DNS, connect, reset, ...).
    #[error("relay transport error: {0}")]
    Transport(String),

    /// The relay answered with a non-2xx status.
    #[error("relay returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The relay answered 2xx but the body was not `{ text, intent }`.
    #[error("malformed relay response: {0}")]
    Malformed(String),

    /// The call was superseded by a newer action.
    #[error("relay call cancelled")]
    Cancelled,
}

impl RelayError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Sends user text to the chat-reply endpoint.
#[async_trait]
pub trait ChatRelay: Send + Sync {
    /// Sends `text` for conversation `session_id`.
    ///
    /// Implementations must return [`RelayError::Cancelled`] promptly once
    /// `cancel` fires.
    async fn send(
        &self,
        text: &str,
        session_id: SessionId,
        cancel: &CancellationToken,
    ) -> Result<RelayReply, RelayError>;
}
