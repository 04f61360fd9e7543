//! The generation engine.
//!
//! [`ModelRuntime`] owns at most one loaded native model handle at a time,
//! keyed by the storage path it was loaded from. Repeated calls against the
//! same active model reuse the handle; switching models frees the old handle
//! before loading the new one. Every failure is translated into a specific
//! [`RuntimeError`] kind before it reaches the caller.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::backend::{last_error_or_unknown, InferenceBackend, LoadedModel, OutputGuard};
use crate::error::{Result, RuntimeError};
use crate::model::{validate_model, ModelCatalog, ModelMetadata};
use crate::state::AppState;
use crate::types::{GenerationParameters, GenerationResult, ENGINE_TEMPERATURE};

/// Turns a prompt plus the currently active model into generated text.
///
/// The handle cache lives behind a [`tokio::sync::Mutex`] held for the whole
/// of [`ModelRuntime::generate`], so concurrent calls queue in order: each
/// runs to completion (including any load) before the next begins, and a
/// call issued while one is outstanding waits rather than being rejected.
/// `generate` blocks for the duration of the native work; run it off any
/// context that must stay responsive.
pub struct ModelRuntime {
    state: Arc<AppState>,
    catalog: Arc<dyn ModelCatalog>,
    backend: Arc<dyn InferenceBackend>,
    loaded: Mutex<Option<LoadedModel>>,
}

impl ModelRuntime {
    /// Create a runtime over the shared state, catalog, and backend.
    pub fn new(
        state: Arc<AppState>,
        catalog: Arc<dyn ModelCatalog>,
        backend: Arc<dyn InferenceBackend>,
    ) -> Self {
        Self {
            state,
            catalog,
            backend,
            loaded: Mutex::new(None),
        }
    }

    /// Generate text from a prompt using the active model.
    ///
    /// `system_prompt` is accepted for forward compatibility but not yet
    /// applied by the native layer. `parameters.max_tokens` is clamped to
    /// the engine ceiling and temperature is pinned; see [`crate::types`].
    pub async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        parameters: GenerationParameters,
    ) -> Result<GenerationResult> {
        let model = self.resolve_active_model().ok_or(RuntimeError::NoActiveModel)?;
        validate_model(&model)?;

        if system_prompt.is_some() {
            debug!("system prompt accepted but not applied by the native layer yet");
        }

        let start = Instant::now();
        let mut slot = self.loaded.lock().await;

        let loaded: &LoadedModel = match &mut *slot {
            Some(existing) if existing.path() == model.path => existing,
            cached => {
                // Free the previous handle before loading its replacement;
                // at most one native handle is resident at any time.
                *cached = None;
                let fresh =
                    LoadedModel::load(self.backend.clone(), &model.path).ok_or_else(|| {
                        RuntimeError::ModelLoadFailed(last_error_or_unknown(self.backend.as_ref()))
                    })?;
                info!(model = %model.id, path = %model.path.display(), "model loaded");
                cached.insert(fresh)
            }
        };

        let max_tokens = parameters.effective_max_tokens();
        let buffer = self
            .backend
            .generate(loaded.handle(), prompt, max_tokens, ENGINE_TEMPERATURE)
            .ok_or_else(|| {
                RuntimeError::GenerationFailed(last_error_or_unknown(self.backend.as_ref()))
            })?;

        // The guard releases the native buffer as soon as decoding is done,
        // on the error path included.
        let text = {
            let output = OutputGuard::new(self.backend.as_ref(), buffer);
            output.text()
        };

        let generation_time = start.elapsed();
        debug!(
            model = %model.id,
            elapsed_ms = generation_time.as_millis() as u64,
            "generation finished"
        );

        Ok(GenerationResult {
            text,
            generation_time,
            // Token accounting is not exposed by the native layer yet.
            tokens_generated: 0,
        })
    }

    /// Whether an active model id exists and resolves in the catalog.
    pub fn has_active_model(&self) -> bool {
        self.resolve_active_model().is_some()
    }

    /// The resolved metadata of the active model, if any.
    pub fn active_model(&self) -> Option<ModelMetadata> {
        self.resolve_active_model()
    }

    fn resolve_active_model(&self) -> Option<ModelMetadata> {
        let id = self.state.active_model_id()?;
        self.catalog.get_model(&id)
    }
}
