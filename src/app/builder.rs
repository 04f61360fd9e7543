//! Builder for the application core.

use std::sync::Arc;

use crate::backend::InferenceBackend;
use crate::config::CoreConfig;
use crate::app::AppCore;
use crate::error::{Result, RuntimeError};
use crate::mode::ModeController;
use crate::model::{JsonCatalog, ModelCatalog, ModelRuntime};
use crate::state::AppState;
use crate::storage::StorageManager;

/// Assembles an [`AppCore`] from a config, a backend, and (optionally) a
/// catalog. When no catalog is supplied, a JSON-backed one is opened under
/// the storage manager's settings directory.
pub struct CoreBuilder {
    config: CoreConfig,
    backend: Option<Arc<dyn InferenceBackend>>,
    catalog: Option<Arc<dyn ModelCatalog>>,
}

impl Default for CoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreBuilder {
    /// Builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: CoreConfig::default(),
            backend: None,
            catalog: None,
        }
    }

    /// Set the core configuration.
    pub fn with_config(mut self, config: CoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the native inference backend. Required.
    pub fn with_backend(mut self, backend: Arc<dyn InferenceBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use an externally owned model catalog instead of the default
    /// JSON-backed one.
    pub fn with_catalog(mut self, catalog: Arc<dyn ModelCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Validate the configuration and assemble the core.
    pub fn build(self) -> Result<AppCore> {
        self.config.validate()?;

        let backend = self.backend.ok_or_else(|| RuntimeError::Configuration {
            parameter: "backend".to_string(),
            message: "an inference backend must be provided".to_string(),
        })?;

        let (catalog, storage) = match self.catalog {
            Some(catalog) => (catalog, None),
            None => {
                let storage = provision_storage(&self.config)?;
                let catalog_path = storage.settings_dir().join("models.json");
                let catalog =
                    JsonCatalog::open(catalog_path).map_err(|error| RuntimeError::Configuration {
                        parameter: "storage_root".to_string(),
                        message: format!("failed to open model catalog: {error}"),
                    })?;
                (Arc::new(catalog) as Arc<dyn ModelCatalog>, Some(storage))
            }
        };

        let state = Arc::new(AppState::new());
        let mode_controller = ModeController::new(state.clone());
        let runtime = Arc::new(ModelRuntime::new(
            state.clone(),
            catalog.clone(),
            backend.clone(),
        ));

        Ok(AppCore::assemble(
            self.config,
            state,
            mode_controller,
            runtime,
            catalog,
            backend,
            storage,
        ))
    }
}

fn provision_storage(config: &CoreConfig) -> Result<StorageManager> {
    let root = config
        .storage_root
        .clone()
        .or_else(StorageManager::default_root)
        .ok_or_else(|| RuntimeError::Configuration {
            parameter: "storage_root".to_string(),
            message: "no storage root configured and the platform exposes no data directory"
                .to_string(),
        })?;

    StorageManager::provision(root).map_err(|error| RuntimeError::Configuration {
        parameter: "storage_root".to_string(),
        message: format!("failed to provision storage: {error}"),
    })
}
