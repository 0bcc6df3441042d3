//! Infrastructure layer for UP Chat.
//!
//! Concrete adapters for the interfaces declared in `upchat-core`: the
//! persistent key/value stores, path resolution and configuration loading.

pub mod config_service;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::paths::UpChatPaths;
pub use crate::storage::{FileStore, MemoryStore};
