//! HttpRelayClient - REST implementation of the chat relay.
//!
//! Calls the UP Chat relay (`POST /chat`), which forwards the utterance to
//! the NLU backend and answers with `{ text, intent }`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use upchat_core::relay::{ChatRelay, RelayError, RelayReply};
use upchat_core::session::SessionId;

/// Relay client that talks to the chat endpoint over HTTP.
#[derive(Clone)]
pub struct HttpRelayClient {
    client: Client,
    endpoint: String,
}

impl HttpRelayClient {
    /// Creates a client posting to `endpoint` (the full `/chat` URL).
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_request(&self, body: &ChatRequest<'_>) -> Result<RelayReply, RelayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|err| RelayError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read relay error body".to_string());
            return Err(RelayError::Status {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| RelayError::Malformed(err.to_string()))?;

        parsed.into_reply()
    }
}

#[async_trait]
impl ChatRelay for HttpRelayClient {
    async fn send(
        &self,
        text: &str,
        session_id: SessionId,
        cancel: &CancellationToken,
    ) -> Result<RelayReply, RelayError> {
        let user_id = session_id.to_string();
        let request = ChatRequest {
            message: text,
            user_id: &user_id,
        };

        // Dropping the request future aborts the HTTP exchange.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RelayError::Cancelled),
            result = self.send_request(&request) => result,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    message: &'a str,
    /// Lets the relay keep one NLU session per conversation.
    user_id: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    text: Option<String>,
    #[serde(default)]
    intent: Option<String>,
}

impl ChatResponse {
    fn into_reply(self) -> Result<RelayReply, RelayError> {
        let text = self
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| RelayError::Malformed("response has no reply text".to_string()))?;
        Ok(RelayReply {
            text,
            intent: self.intent.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(ChatRequest {
            message: "สวัสดี",
            user_id: "1700000000000",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "message": "สวัสดี", "userId": "1700000000000" })
        );
    }

    #[test]
    fn test_blank_text_is_malformed() {
        let response = ChatResponse {
            text: Some("   ".to_string()),
            intent: Some("Default Fallback Intent".to_string()),
        };
        assert!(matches!(
            response.into_reply(),
            Err(RelayError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_intent_defaults_to_empty() {
        let response: ChatResponse = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        let reply = response.into_reply().unwrap();
        assert_eq!(reply.text, "hi");
        assert_eq!(reply.intent, "");
    }
}
