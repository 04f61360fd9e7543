//! Scripted in-memory backend for tests.
//!
//! Records every call and hands out fake handles/buffers so tests can assert
//! load/reuse/release behavior and inspect exactly what the runtime issued
//! to the native boundary.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::{InferenceBackend, ModelHandle, OutputBuffer};

/// One recorded call to [`InferenceBackend::generate`].
#[derive(Debug, Clone)]
pub(crate) struct GenerateCall {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Default)]
struct Inner {
    next_token: usize,
    live_handles: HashSet<usize>,
    live_buffers: HashMap<usize, String>,
    load_count: usize,
    free_model_count: usize,
    generate_count: usize,
    free_buffer_count: usize,
    loaded_paths: Vec<PathBuf>,
    generate_calls: Vec<GenerateCall>,
    fail_next_load: Option<String>,
    fail_next_generate: Option<String>,
    reply: Option<String>,
    last_error: Option<String>,
}

/// Test backend with scripted outcomes.
pub(crate) struct MockBackend {
    inner: Mutex<Inner>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Fixed reply text for subsequent generations.
    pub fn set_reply(&self, text: impl Into<String>) {
        self.inner.lock().reply = Some(text.into());
    }

    /// Make the next load fail with the given error detail.
    pub fn fail_next_load(&self, message: impl Into<String>) {
        self.inner.lock().fail_next_load = Some(message.into());
    }

    /// Make the next generation fail with the given error detail.
    pub fn fail_next_generate(&self, message: impl Into<String>) {
        self.inner.lock().fail_next_generate = Some(message.into());
    }

    pub fn load_count(&self) -> usize {
        self.inner.lock().load_count
    }

    pub fn free_model_count(&self) -> usize {
        self.inner.lock().free_model_count
    }

    pub fn generate_count(&self) -> usize {
        self.inner.lock().generate_count
    }

    pub fn free_buffer_count(&self) -> usize {
        self.inner.lock().free_buffer_count
    }

    pub fn live_handles(&self) -> usize {
        self.inner.lock().live_handles.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.inner.lock().live_buffers.len()
    }

    pub fn loaded_paths(&self) -> Vec<PathBuf> {
        self.inner.lock().loaded_paths.clone()
    }

    pub fn generate_calls(&self) -> Vec<GenerateCall> {
        self.inner.lock().generate_calls.clone()
    }
}

impl InferenceBackend for MockBackend {
    fn load_model(&self, path: &Path) -> Option<ModelHandle> {
        let mut inner = self.inner.lock();
        inner.load_count += 1;
        if let Some(message) = inner.fail_next_load.take() {
            inner.last_error = Some(message);
            return None;
        }
        inner.next_token += 1;
        let token = inner.next_token;
        inner.live_handles.insert(token);
        inner.loaded_paths.push(path.to_path_buf());
        inner.last_error = None;
        Some(ModelHandle(token))
    }

    fn free_model(&self, handle: ModelHandle) {
        let mut inner = self.inner.lock();
        inner.free_model_count += 1;
        assert!(
            inner.live_handles.remove(&handle.0),
            "double free of model handle {}",
            handle.0
        );
    }

    fn generate(
        &self,
        handle: &ModelHandle,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Option<OutputBuffer> {
        let mut inner = self.inner.lock();
        inner.generate_count += 1;
        assert!(
            inner.live_handles.contains(&handle.0),
            "generate on freed handle {}",
            handle.0
        );
        inner.generate_calls.push(GenerateCall {
            prompt: prompt.to_string(),
            max_tokens,
            temperature,
        });
        if let Some(message) = inner.fail_next_generate.take() {
            inner.last_error = Some(message);
            return None;
        }
        let text = inner
            .reply
            .clone()
            .unwrap_or_else(|| format!("{prompt} [generated]"));
        inner.next_token += 1;
        let token = inner.next_token;
        inner.live_buffers.insert(token, text);
        inner.last_error = None;
        Some(OutputBuffer(token))
    }

    fn buffer_text(&self, buffer: &OutputBuffer) -> String {
        self.inner
            .lock()
            .live_buffers
            .get(&buffer.0)
            .cloned()
            .unwrap_or_default()
    }

    fn free_buffer(&self, buffer: OutputBuffer) {
        let mut inner = self.inner.lock();
        inner.free_buffer_count += 1;
        assert!(
            inner.live_buffers.remove(&buffer.0).is_some(),
            "double free of output buffer {}",
            buffer.0
        );
    }

    fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }
}
