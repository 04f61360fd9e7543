//! The assembled application core.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::backend::{last_error_or_unknown, InferenceBackend, LoadedModel, OutputGuard};
use crate::config::CoreConfig;
use crate::app::CoreBuilder;
use crate::mode::ModeController;
use crate::model::{validate_model, ModelCatalog, ModelRuntime};
use crate::state::AppState;
use crate::error::Result;
use crate::storage::StorageManager;
use crate::types::{GenerationParameters, GenerationResult, ENGINE_TEMPERATURE, MAX_TOKENS_CEILING};

/// Owns the shared state and the components built around it.
///
/// One instance per process, created once at startup through
/// [`CoreBuilder`].
pub struct AppCore {
    config: CoreConfig,
    state: Arc<AppState>,
    mode_controller: ModeController,
    runtime: Arc<ModelRuntime>,
    catalog: Arc<dyn ModelCatalog>,
    backend: Arc<dyn InferenceBackend>,
    storage: Option<StorageManager>,
}

impl AppCore {
    /// Start building a core.
    pub fn builder() -> CoreBuilder {
        CoreBuilder::new()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        config: CoreConfig,
        state: Arc<AppState>,
        mode_controller: ModeController,
        runtime: Arc<ModelRuntime>,
        catalog: Arc<dyn ModelCatalog>,
        backend: Arc<dyn InferenceBackend>,
        storage: Option<StorageManager>,
    ) -> Self {
        Self {
            config,
            state,
            mode_controller,
            runtime,
            catalog,
            backend,
            storage,
        }
    }

    /// The shared application state.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// The mode/memory-policy controller.
    pub fn mode_controller(&self) -> &ModeController {
        &self.mode_controller
    }

    /// The generation runtime.
    pub fn runtime(&self) -> &Arc<ModelRuntime> {
        &self.runtime
    }

    /// The storage manager, present when the core provisioned its own
    /// catalog.
    pub fn storage(&self) -> Option<&StorageManager> {
        self.storage.as_ref()
    }

    /// The active configuration.
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Generate text using the active model, falling back to the configured
    /// [`CoreConfig::default_parameters`] when the caller passes none.
    ///
    /// Thin wrapper over [`ModelRuntime::generate`]; see it for blocking and
    /// serialization behavior.
    pub async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        parameters: Option<GenerationParameters>,
    ) -> Result<GenerationResult> {
        let parameters = parameters.unwrap_or(self.config.default_parameters);
        self.runtime.generate(prompt, system_prompt, parameters).await
    }

    /// Fire the startup diagnostic probe on a background worker.
    ///
    /// One bounded generation against the active model, loaded and freed
    /// independently of the runtime's handle cache. The outcome is logged
    /// and never surfaced; there is no result channel and no cancellation.
    /// Must be called from within a tokio runtime.
    pub fn spawn_startup_probe(&self) {
        if !self.config.probe.enabled {
            return;
        }
        let state = self.state.clone();
        let catalog = self.catalog.clone();
        let backend = self.backend.clone();
        let prompt = self.config.probe.prompt.clone();

        tokio::task::spawn_blocking(move || {
            run_probe(&state, catalog.as_ref(), backend, &prompt);
        });
    }
}

/// The probe body. Failures are logging-only by design.
fn run_probe(
    state: &AppState,
    catalog: &dyn ModelCatalog,
    backend: Arc<dyn InferenceBackend>,
    prompt: &str,
) {
    let Some(id) = state.active_model_id() else {
        debug!("startup probe skipped: no active model");
        return;
    };
    let Some(model) = catalog.get_model(&id) else {
        debug!(model = %id, "startup probe skipped: active model not in catalog");
        return;
    };
    if let Err(error) = validate_model(&model) {
        warn!(model = %id, %error, "startup probe skipped: model failed validation");
        return;
    }

    let start = Instant::now();
    let Some(loaded) = LoadedModel::load(backend.clone(), &model.path) else {
        warn!(
            model = %id,
            error = %last_error_or_unknown(backend.as_ref()),
            "startup probe: model load failed"
        );
        return;
    };

    match backend.generate(loaded.handle(), prompt, MAX_TOKENS_CEILING, ENGINE_TEMPERATURE) {
        Some(buffer) => {
            let text = {
                let output = OutputGuard::new(backend.as_ref(), buffer);
                output.text()
            };
            info!(
                model = %id,
                chars = text.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "startup probe succeeded"
            );
        }
        None => {
            warn!(
                model = %id,
                error = %last_error_or_unknown(backend.as_ref()),
                "startup probe: generation failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::config::ProbeConfig;
    use crate::model::{JsonCatalog, ModelFormat, ModelMetadata};
    use crate::state::{AppMode, MemoryPolicy};
    use std::io::Write;
    use std::time::Duration;

    fn create_core_with_model(config: CoreConfig) -> (AppCore, Arc<MockBackend>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.gguf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"GGUF....").unwrap();

        let catalog = Arc::new(JsonCatalog::in_memory());
        catalog
            .insert(ModelMetadata {
                id: "tiny".to_string(),
                name: "Tiny".to_string(),
                format: ModelFormat::Gguf,
                path,
                size_bytes: 8,
            })
            .unwrap();

        let backend = Arc::new(MockBackend::new());
        let core = AppCore::builder()
            .with_config(config)
            .with_backend(backend.clone())
            .with_catalog(catalog)
            .build()
            .unwrap();
        core.state().set_active_model_id(Some("tiny".to_string()));
        (core, backend, dir)
    }

    #[tokio::test]
    async fn test_core_generation_flow() {
        let (core, backend, _dir) = create_core_with_model(CoreConfig::default());

        core.mode_controller().switch_to_mode(AppMode::Rag);
        assert_eq!(core.state().memory_policy(), MemoryPolicy::Off);

        let result = core
            .runtime()
            .generate("hello", None, Default::default())
            .await
            .unwrap();
        assert!(!result.text.is_empty());
        assert_eq!(backend.load_count(), 1);
    }

    #[tokio::test]
    async fn test_probe_loads_and_frees_its_own_handle() {
        let (core, backend, _dir) = create_core_with_model(CoreConfig::default());
        core.spawn_startup_probe();

        // Fire-and-forget: poll for completion rather than joining.
        for _ in 0..100 {
            if backend.generate_count() == 1 && backend.live_handles() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(backend.load_count(), 1);
        assert_eq!(backend.generate_count(), 1);
        assert_eq!(backend.live_handles(), 0);
        assert_eq!(backend.live_buffers(), 0);
        assert_eq!(backend.generate_calls()[0].prompt, "The dog wagged its tail and");

        // The probe never touched the runtime's cache.
        core.runtime()
            .generate("hello", None, Default::default())
            .await
            .unwrap();
        assert_eq!(backend.load_count(), 2);
    }

    #[tokio::test]
    async fn test_probe_failure_is_swallowed() {
        let (core, backend, _dir) = create_core_with_model(CoreConfig::default());
        backend.fail_next_load("no memory");
        core.spawn_startup_probe();

        for _ in 0..100 {
            if backend.load_count() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        // Nothing generated, nothing leaked, nothing surfaced.
        assert_eq!(backend.generate_count(), 0);
        assert_eq!(backend.live_handles(), 0);
    }

    #[tokio::test]
    async fn test_configured_default_parameters_apply_when_caller_passes_none() {
        let config = CoreConfig {
            default_parameters: GenerationParameters {
                max_tokens: 16,
                ..Default::default()
            },
            ..Default::default()
        };
        let (core, backend, _dir) = create_core_with_model(config);

        core.generate("hello", None, None).await.unwrap();
        assert_eq!(backend.generate_calls()[0].max_tokens, 16);

        // Explicit parameters still win over the configured defaults.
        let explicit = GenerationParameters {
            max_tokens: 8,
            ..Default::default()
        };
        core.generate("hello", None, Some(explicit)).await.unwrap();
        assert_eq!(backend.generate_calls()[1].max_tokens, 8);
    }

    #[tokio::test]
    async fn test_probe_disabled_by_config() {
        let backend = Arc::new(MockBackend::new());
        let config = CoreConfig {
            probe: ProbeConfig {
                enabled: false,
                prompt: String::new(),
            },
            ..Default::default()
        };
        let core = AppCore::builder()
            .with_config(config)
            .with_backend(backend.clone())
            .with_catalog(Arc::new(JsonCatalog::in_memory()))
            .build()
            .unwrap();
        core.spawn_startup_probe();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(backend.load_count(), 0);
    }
}
