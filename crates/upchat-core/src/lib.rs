//! Domain layer for UP Chat.
//!
//! Pure types and the interfaces the rest of the workspace plugs into:
//! conversation models, the persistent store trait, the relay trait and the
//! configuration model. Nothing in this crate performs I/O.

pub mod config;
pub mod error;
pub mod relay;
pub mod session;
pub mod store;
pub mod user;

// Re-export common error type
pub use error::UpChatError;
