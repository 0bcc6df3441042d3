//! Application layer for UP Chat.
//!
//! This crate provides the use cases that coordinate the domain types in
//! `upchat-core` with a relay and a key/value store: the active
//! conversation, its history, and the user profile.

pub mod profile_service;
pub mod session;

pub use profile_service::ProfileService;
pub use session::{
    ConversationController, ConversationPhase, PendingSend, SendOutcome, SessionRepository,
};
