//! Thoth Engine - on-device text generation over quantized GGUF models.
//!
//! This crate provides the model-runtime lifecycle (validation, lazy
//! load/reuse/replace of a native model handle, bounded generation) and the
//! mode/memory-policy state machine that gates how the surrounding
//! application may use conversation memory.
//!
//! The native inference backend is an injected [`backend::InferenceBackend`];
//! enable the `llama-bridge` feature to link the llama.cpp bridge
//! implementation.

#![warn(missing_docs)]

// Public modules
pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod mode;
pub mod model;
pub mod state;
pub mod storage;
pub mod types;
pub mod utils;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-exports for the public API
pub use app::{AppCore, CoreBuilder};
pub use backend::InferenceBackend;
pub use config::{CoreConfig, ProbeConfig};
pub use error::{Result, RuntimeError};
pub use mode::ModeController;
pub use model::{JsonCatalog, ModelCatalog, ModelFormat, ModelMetadata, ModelRuntime};
pub use state::{AppMode, AppState, MemoryPolicy, StateSnapshot};
pub use storage::StorageManager;
pub use types::{GenerationParameters, GenerationResult, ENGINE_TEMPERATURE, MAX_TOKENS_CEILING};
pub use utils::logging::{setup_logging, LogConfig};
