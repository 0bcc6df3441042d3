//! Wiring of config, store, relay and services for one process.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use upchat_application::{ConversationController, ProfileService};
use upchat_core::config::RootConfig;
use upchat_core::store::KeyValueStore;
use upchat_infrastructure::{ConfigService, FileStore, UpChatPaths};
use upchat_interaction::HttpRelayClient;

/// Loads the config file (or defaults) and resolves the data directory.
///
/// `data_dir` from the command line wins over the config file.
pub fn load_config(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<(RootConfig, UpChatPaths)> {
    let config_service = match config_path {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::default_location()?,
    };
    let config = config_service
        .load()
        .with_context(|| format!("Failed to load {}", config_service.path().display()))?;

    let paths = UpChatPaths::new(data_dir.or_else(|| config.storage.data_dir.clone()));
    Ok((config, paths))
}

pub struct App {
    pub config: RootConfig,
    pub controller: ConversationController,
    pub profile: Arc<ProfileService>,
}

impl App {
    /// Opens the store and restores the last conversation.
    pub fn open(config: RootConfig, paths: &UpChatPaths) -> Result<Self> {
        let store_dir = paths.store_dir()?;
        let store: Arc<dyn KeyValueStore> = Arc::new(
            FileStore::open(&store_dir)
                .with_context(|| format!("Failed to open store at {}", store_dir.display()))?,
        );

        let profile = Arc::new(ProfileService::load(
            store.clone(),
            config.user_profile.default_display_name.clone(),
        ));
        let relay = Arc::new(HttpRelayClient::new(config.relay.endpoint.clone()));
        let controller = ConversationController::new(relay, store, config.chat.clone())
            .with_user_service(profile.clone());

        tracing::info!(
            "[App] Opened store {} (relay: {})",
            store_dir.display(),
            config.relay.endpoint
        );

        Ok(Self {
            config,
            controller,
            profile,
        })
    }

    pub fn bot_name(&self) -> &str {
        &self.config.chat.bot_name
    }

    /// Cancels pending work and flushes the store.
    pub async fn close(&self) -> Result<()> {
        self.controller
            .shutdown()
            .await
            .context("Failed to flush store on exit")
    }
}
