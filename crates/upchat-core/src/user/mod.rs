//! User domain module.
//!
//! # Module Structure
//!
//! - `model`: User profile domain model
//! - `service`: User service trait and a default implementation
//!
//! # Usage
//!
//! ```ignore
//! use upchat_core::user::{UserProfile, UserService, DefaultUserService};
//! ```

mod model;
mod service;

// Re-export public API
pub use model::UserProfile;
pub use service::{DefaultUserService, UserService};
