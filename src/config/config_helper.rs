//! Configuration helper for interpreting config values.
//!
//! The `ConfigHelper` wraps a `Config` and derives the settings other
//! components are built from.

use std::path::Path;

use crate::store::StoreSettings;

use super::Config;

/// Helper for interpreting configuration values.
#[derive(Debug, Clone)]
pub struct ConfigHelper {
    config: Config,
}

impl ConfigHelper {
    /// Create a new ConfigHelper wrapping the given config.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get a reference to the underlying config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Settings for the repository store.
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            default_branch: self.config.repositories.default_branch.clone(),
            proposal_visibility: self.config.proposals.visibility,
        }
    }

    /// Path of the snapshot file, or `None` when state is memory-only.
    pub fn state_path(&self) -> Option<&Path> {
        if self.config.state.persist {
            Some(&self.config.state.path)
        } else {
            None
        }
    }

    /// Tracing filter directives.
    pub fn log_filter(&self) -> &str {
        &self.config.log.filter
    }
}

impl From<Config> for ConfigHelper {
    fn from(config: Config) -> Self {
        Self::new(config)
    }
}
