//! Interaction layer for UP Chat.
//!
//! Talks to the outside world on behalf of the conversation: currently the
//! HTTP relay in front of the NLU service.

pub mod relay_client;

pub use relay_client::HttpRelayClient;
