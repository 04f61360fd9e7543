//! Native inference backend boundary.
//!
//! The backend is an opaque, handle-based load/generate/free interface: the
//! runtime never looks inside a handle or a buffer, it only moves them
//! between the calls defined here. Failure is signaled by `None`; detail is
//! fetched separately through [`InferenceBackend::last_error`].
//!
//! Resource discipline: [`ModelHandle`] and [`OutputBuffer`] are non-copy
//! tokens, so each can be freed exactly once. [`LoadedModel`] and
//! [`OutputGuard`] wrap them with guaranteed release on every exit path,
//! including error paths after a partial load.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::trace;

#[cfg(feature = "llama-bridge")]
pub mod llama;

#[cfg(test)]
pub(crate) mod mock;

/// Opaque token for a model loaded by a backend. Pointer-width so FFI
/// backends can store a raw pointer in it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ModelHandle(pub(crate) usize);

/// Opaque token for an output buffer returned by a generation call.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct OutputBuffer(pub(crate) usize);

/// Contract for a native inference backend.
///
/// Implementations are black boxes: `load_model` and `generate` may block
/// for seconds, and `None` returns mean failure with detail available from
/// `last_error`. Every non-`None` handle or buffer must be released exactly
/// once through the matching free call.
pub trait InferenceBackend: Send + Sync {
    /// Load a model from a file path. `None` indicates failure.
    fn load_model(&self, path: &Path) -> Option<ModelHandle>;

    /// Release a handle returned by [`InferenceBackend::load_model`].
    fn free_model(&self, handle: ModelHandle);

    /// Run a bounded generation against a loaded model. `None` indicates
    /// failure.
    fn generate(
        &self,
        handle: &ModelHandle,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Option<OutputBuffer>;

    /// Decode a buffer returned by [`InferenceBackend::generate`] into text.
    /// Invalid UTF-8 is replaced, never an error.
    fn buffer_text(&self, buffer: &OutputBuffer) -> String;

    /// Release a buffer returned by [`InferenceBackend::generate`].
    fn free_buffer(&self, buffer: OutputBuffer);

    /// Human-readable description of the most recent failure in this
    /// backend, if it recorded one.
    fn last_error(&self) -> Option<String>;
}

/// The backend's last error, or the uniform fallback when it reports none.
pub(crate) fn last_error_or_unknown(backend: &dyn InferenceBackend) -> String {
    backend
        .last_error()
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| crate::error::UNKNOWN_BACKEND_ERROR.to_string())
}

/// A loaded model paired with the path it was loaded from.
///
/// Exclusively owned; the handle is freed when this wrapper drops, so
/// replacing or discarding a loaded model can never leak the native
/// resource.
pub(crate) struct LoadedModel {
    backend: Arc<dyn InferenceBackend>,
    handle: Option<ModelHandle>,
    path: PathBuf,
}

impl LoadedModel {
    /// Load a model through the backend. `None` mirrors the backend's own
    /// failure signal; the caller classifies it.
    pub fn load(backend: Arc<dyn InferenceBackend>, path: &Path) -> Option<Self> {
        let handle = backend.load_model(path)?;
        trace!(path = %path.display(), "model loaded");
        Some(Self {
            backend,
            handle: Some(handle),
            path: path.to_path_buf(),
        })
    }

    /// Path this model was loaded from; the cache key for reuse decisions.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The live native handle.
    pub fn handle(&self) -> &ModelHandle {
        // Only None after Drop has run, which no caller can observe.
        self.handle.as_ref().expect("handle taken before drop")
    }
}

impl Drop for LoadedModel {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            trace!(path = %self.path.display(), "model handle released");
            self.backend.free_model(handle);
        }
    }
}

/// Scoped ownership of a generation output buffer. Frees the buffer on drop
/// so decode failures cannot leak it.
pub(crate) struct OutputGuard<'a> {
    backend: &'a dyn InferenceBackend,
    buffer: Option<OutputBuffer>,
}

impl<'a> OutputGuard<'a> {
    pub fn new(backend: &'a dyn InferenceBackend, buffer: OutputBuffer) -> Self {
        Self {
            backend,
            buffer: Some(buffer),
        }
    }

    /// Decode the buffer into owned text.
    pub fn text(&self) -> String {
        match &self.buffer {
            Some(buffer) => self.backend.buffer_text(buffer),
            None => String::new(),
        }
    }
}

impl Drop for OutputGuard<'_> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.backend.free_buffer(buffer);
        }
    }
}
