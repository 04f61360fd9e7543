//! Core configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};
use crate::types::GenerationParameters;

/// Configuration for assembling an application core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Root directory for app-managed storage. `None` selects the
    /// platform's per-user data directory.
    pub storage_root: Option<PathBuf>,

    /// Generation parameters used when a caller passes none.
    pub default_parameters: GenerationParameters,

    /// Startup diagnostic probe settings.
    pub probe: ProbeConfig,
}

/// Settings for the fire-and-forget generation probe fired at launch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Whether the probe runs at all.
    pub enabled: bool,
    /// Prompt the probe generates from.
    pub prompt: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_root: None,
            default_parameters: GenerationParameters::default(),
            probe: ProbeConfig::default(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prompt: "The dog wagged its tail and".to_string(),
        }
    }
}

impl CoreConfig {
    /// Validate the configuration before any component is built.
    pub fn validate(&self) -> Result<()> {
        if self.default_parameters.max_tokens == 0 {
            return Err(RuntimeError::Configuration {
                parameter: "default_parameters.max_tokens".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.probe.enabled && self.probe.prompt.trim().is_empty() {
            return Err(RuntimeError::Configuration {
                parameter: "probe.prompt".to_string(),
                message: "cannot be empty while the probe is enabled".to_string(),
            });
        }

        Ok(())
    }
}
