//! Session application services.
//!
//! This module contains the controller for the active conversation and the
//! repository that keeps the session history.

mod controller;
mod repository;
mod snapshot;

pub use controller::{
    ConversationController, ConversationPhase, ConversationSnapshot, PendingSend, SendOutcome,
};
pub use repository::{SessionRepository, UpsertOutcome};
