//! ProfileService - the persisted user profile.
//!
//! Display name and avatar are stored under their own keys, independently
//! of the chat history, and survive history clears.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;
use std::sync::{Arc, RwLock};
use upchat_core::error::{Result, UpChatError};
use upchat_core::store::{KeyValueStore, keys};
use upchat_core::user::{UserProfile, UserService};

/// Largest avatar image accepted, in bytes.
pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

/// Reads and updates the user profile.
pub struct ProfileService {
    store: Arc<dyn KeyValueStore>,
    profile: RwLock<UserProfile>,
    default_display_name: String,
}

impl ProfileService {
    /// Loads the profile from `store`.
    ///
    /// A missing or empty name falls back to `default_display_name`; a
    /// stored avatar that is not an image data URI is ignored.
    pub fn load(store: Arc<dyn KeyValueStore>, default_display_name: impl Into<String>) -> Self {
        let default_display_name = default_display_name.into();

        let display_name = read_text(store.as_ref(), keys::DISPLAY_NAME)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| default_display_name.clone());

        let avatar_image = read_text(store.as_ref(), keys::AVATAR_IMAGE).filter(|uri| {
            let valid = parse_data_uri(uri).is_some();
            if !valid {
                tracing::warn!("[ProfileService] Ignoring stored avatar that is not an image");
            }
            valid
        });

        Self {
            store,
            profile: RwLock::new(UserProfile {
                display_name,
                avatar_image,
            }),
            default_display_name,
        }
    }

    pub fn profile(&self) -> UserProfile {
        self.profile
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Sets the display name. Surrounding whitespace is dropped; an empty
    /// name is rejected.
    pub fn set_display_name(&self, name: &str) -> Result<UserProfile> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UpChatError::invalid_input("display name must not be empty"));
        }

        self.persist(keys::DISPLAY_NAME, name);
        Ok(self.update(|profile| profile.display_name = name.to_string()))
    }

    /// Restores the configured default display name.
    pub fn reset_display_name(&self) -> UserProfile {
        if let Err(e) = self.store.remove(keys::DISPLAY_NAME) {
            tracing::warn!("[ProfileService] Failed to remove display name: {}", e);
        }
        let name = self.default_display_name.clone();
        self.update(|profile| profile.display_name = name)
    }

    /// Reads an image file and stores it as the avatar.
    pub fn set_avatar_from_file(&self, path: &Path) -> Result<UserProfile> {
        let mime = mime_guess::from_path(path)
            .first()
            .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
            .ok_or_else(|| {
                UpChatError::invalid_input(format!("{} is not an image file", path.display()))
            })?;

        let size = std::fs::metadata(path)?.len();
        if size > MAX_AVATAR_BYTES as u64 {
            return Err(too_large(size));
        }
        let bytes = std::fs::read(path)?;
        self.set_avatar_bytes(&bytes, mime.essence_str())
    }

    /// Stores raw image bytes of type `mime` as the avatar.
    pub fn set_avatar_bytes(&self, bytes: &[u8], mime: &str) -> Result<UserProfile> {
        if !mime.starts_with("image/") {
            return Err(UpChatError::invalid_input(format!(
                "{} is not an image type",
                mime
            )));
        }
        if bytes.is_empty() {
            return Err(UpChatError::invalid_input("image is empty"));
        }
        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(too_large(bytes.len() as u64));
        }

        let uri = format!("data:{};base64,{}", mime, STANDARD.encode(bytes));
        self.persist(keys::AVATAR_IMAGE, &uri);
        tracing::info!(
            "[ProfileService] Avatar updated ({}, {} bytes)",
            mime,
            bytes.len()
        );
        Ok(self.update(|profile| profile.avatar_image = Some(uri)))
    }

    pub fn clear_avatar(&self) -> UserProfile {
        if let Err(e) = self.store.remove(keys::AVATAR_IMAGE) {
            tracing::warn!("[ProfileService] Failed to remove avatar: {}", e);
        }
        self.update(|profile| profile.avatar_image = None)
    }

    fn update(&self, apply: impl FnOnce(&mut UserProfile)) -> UserProfile {
        let mut profile = self
            .profile
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        apply(&mut profile);
        profile.clone()
    }

    /// Profile writes are best effort: the in-memory value wins for this run.
    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value.as_bytes()) {
            tracing::warn!("[ProfileService] Failed to persist {}: {}", key, e);
        }
    }
}

impl UserService for ProfileService {
    fn get_user_profile(&self) -> UserProfile {
        self.profile()
    }
}

fn read_text(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(bytes) => bytes.and_then(|b| String::from_utf8(b).ok()),
        Err(e) => {
            tracing::warn!("[ProfileService] Failed to read {}: {}", key, e);
            None
        }
    }
}

fn too_large(size: u64) -> UpChatError {
    UpChatError::invalid_input(format!(
        "image is {} bytes, the limit is {} bytes",
        size, MAX_AVATAR_BYTES
    ))
}

/// Splits an image data URI into its MIME type and decoded bytes.
pub fn parse_data_uri(uri: &str) -> Option<(&str, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    if !mime.starts_with("image/") {
        return None;
    }
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use upchat_infrastructure::MemoryStore;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn service(store: &MemoryStore) -> ProfileService {
        ProfileService::load(Arc::new(store.clone()), "You")
    }

    #[test]
    fn test_defaults_when_nothing_stored() {
        let profile = service(&MemoryStore::new()).profile();
        assert_eq!(profile.display_name, "You");
        assert!(!profile.has_avatar());
    }

    #[test]
    fn test_display_name_persists() {
        let store = MemoryStore::new();
        service(&store).set_display_name("  มานี ").unwrap();

        assert_eq!(store.get_text(keys::DISPLAY_NAME).as_deref(), Some("มานี"));
        assert_eq!(service(&store).get_user_name(), "มานี");
    }

    #[test]
    fn test_empty_display_name_is_rejected() {
        let store = MemoryStore::new();
        let svc = service(&store);
        svc.set_display_name("Ann").unwrap();

        let err = svc.set_display_name("   ").unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(svc.get_user_name(), "Ann");
    }

    #[test]
    fn test_reset_display_name() {
        let store = MemoryStore::new();
        let svc = service(&store);
        svc.set_display_name("Ann").unwrap();

        assert_eq!(svc.reset_display_name().display_name, "You");
        assert!(!store.contains(keys::DISPLAY_NAME));
    }

    #[test]
    fn test_avatar_from_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("me.png");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let store = MemoryStore::new();
        let profile = service(&store).set_avatar_from_file(&path).unwrap();
        let uri = profile.avatar_image.unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        let reloaded = service(&store).profile();
        let (mime, bytes) = parse_data_uri(reloaded.avatar_image.as_deref().unwrap()).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, PNG_HEADER);
    }

    #[test]
    fn test_non_image_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let store = MemoryStore::new();
        let err = service(&store).set_avatar_from_file(&path).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(!store.contains(keys::AVATAR_IMAGE));
    }

    #[test]
    fn test_oversized_avatar_is_rejected() {
        let store = MemoryStore::new();
        let big = vec![0u8; MAX_AVATAR_BYTES + 1];
        let err = service(&store).set_avatar_bytes(&big, "image/jpeg").unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_clear_avatar() {
        let store = MemoryStore::new();
        let svc = service(&store);
        svc.set_avatar_bytes(PNG_HEADER, "image/png").unwrap();

        assert!(!svc.clear_avatar().has_avatar());
        assert!(!store.contains(keys::AVATAR_IMAGE));
    }

    #[test]
    fn test_stored_garbage_avatar_is_ignored() {
        let store = MemoryStore::new();
        store.set(keys::AVATAR_IMAGE, b"data:text/html;base64,PGI+").unwrap();
        assert!(!service(&store).profile().has_avatar());
    }
}
