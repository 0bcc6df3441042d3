//! User service for reading user information.
//!
//! Consumers that only need to label messages (export, the REPL prompt)
//! depend on this trait instead of the concrete profile store.

use super::model::UserProfile;

/// Read access to the current user's profile.
pub trait UserService: Send + Sync {
    /// Returns the current user's display name.
    fn get_user_name(&self) -> String {
        self.get_user_profile().display_name
    }

    /// Returns the complete user profile.
    fn get_user_profile(&self) -> UserProfile;
}

/// Implementation that always returns the default profile.
///
/// # Example
///
/// ```
/// use upchat_core::user::{UserService, DefaultUserService};
///
/// let service = DefaultUserService::default();
/// assert_eq!(service.get_user_name(), "You");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefaultUserService;

impl UserService for DefaultUserService {
    fn get_user_profile(&self) -> UserProfile {
        UserProfile::default()
    }
}
