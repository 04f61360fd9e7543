//! Error taxonomy for the runtime core.
//!
//! Every failure a caller can observe maps to one of these kinds. Validation
//! errors are raised before the native backend is ever touched; backend
//! errors carry the backend's own description verbatim, with a generic
//! fallback when it reports none.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Fallback detail used when the native backend reports no error string.
pub const UNKNOWN_BACKEND_ERROR: &str = "Unknown error";

/// Errors surfaced by the model runtime.
///
/// None of these are process-fatal: the application stays usable and may
/// retry with a different model or prompt. The runtime never retries on its
/// own; after a [`RuntimeError::ModelLoadFailed`] the handle cache is left
/// empty, so a subsequent `generate` re-attempts the load.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// No model id is selected, or the selected id does not resolve in the
    /// catalog.
    #[error("No active model selected. Please import and activate a model first.")]
    NoActiveModel,

    /// The model's declared format is not the supported one.
    #[error("{0}")]
    UnsupportedFormat(String),

    /// The declared storage path does not exist.
    #[error("Model file missing: {0}. The file may have been moved or deleted.")]
    ModelFileMissing(String),

    /// The declared storage path exists but cannot be read.
    #[error("Model file unreadable: {0}. Please check file permissions.")]
    ModelFileUnreadable(String),

    /// The native backend rejected the load.
    #[error("Failed to load model: {0}")]
    ModelLoadFailed(String),

    /// The native backend rejected the generation call.
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Invalid runtime configuration, detected before any model work.
    #[error("Configuration error for {parameter}: {message}")]
    Configuration {
        /// Offending configuration field.
        parameter: String,
        /// Human-readable description.
        message: String,
    },
}

impl RuntimeError {
    /// Whether this error was produced by the validation gate, i.e. before
    /// any native backend call was made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RuntimeError::NoActiveModel
                | RuntimeError::UnsupportedFormat(_)
                | RuntimeError::ModelFileMissing(_)
                | RuntimeError::ModelFileUnreadable(_)
        )
    }
}
