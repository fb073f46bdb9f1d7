use anyhow::{Context, Result};
use std::sync::Arc;

use crate::prefs::{JsonFileStore, KeyValueStore};
use crate::Config;

/// Explicitly constructed application context.
///
/// Holds the configuration and the preference store; pass it (or the pieces
/// it hands out) to whatever needs them instead of reaching for globals.
pub struct AppContext {
    config: Config,
    preferences: Arc<JsonFileStore>,
}

impl AppContext {
    /// Build a context from an already loaded configuration
    pub fn new(config: Config) -> Result<Self> {
        let preferences = JsonFileStore::open(&config.config_dir, &config.storage.namespace)
            .context("Failed to open preference store")?;

        tracing::info!(
            "Application context ready (preferences at {})",
            preferences.path().display()
        );

        Ok(Self {
            config,
            preferences: Arc::new(preferences),
        })
    }

    /// Load and validate the configuration from its default location, then build the context
    pub fn load() -> Result<Self> {
        let (config, _warnings) = Config::load_validated()?;
        Self::new(config)
    }

    /// Get the application configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Preference store scoped to the configured namespace
    pub fn preferences(&self) -> Arc<dyn KeyValueStore> {
        self.preferences.clone()
    }
}
