//! Session domain module.
//!
//! This module contains the conversation domain models: messages, the active
//! transcript, persisted sessions, id minting and plain-text export.
//!
//! # Module Structure
//!
//! - `message`: Conversation message types (`Message`, `Sender`)
//! - `transcript`: The active transcript and edit retraction (`Transcript`)
//! - `model`: Persisted session model and title derivation (`Session`)
//! - `id`: Session id minting (`SessionIdGenerator`)
//! - `export`: Plain-text rendering of a transcript
//!
//! # Usage
//!
//! ```ignore
//! use upchat_core::session::{Message, Sender, Session, Transcript};
//! ```

mod export;
mod id;
mod message;
mod model;
mod transcript;

// Re-export public API
pub use export::render_transcript;
pub use id::SessionIdGenerator;
pub use message::{Message, MessageId, Sender};
pub use model::{Session, SessionId, UNTITLED_SESSION, base_title, derive_title};
pub use transcript::{Retraction, Transcript, WELCOME_MESSAGE_ID};
