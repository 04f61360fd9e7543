//! Backend implementation over the native llama.cpp bridge library.
//!
//! Mirrors the C interface exposed by `llama_bridge`: handle-based load and
//! free, one-shot bounded generation returning a malloc'd C string, and a
//! process-wide last-error accessor. All pointers stay inside this module;
//! the rest of the crate only sees the opaque tokens from [`super`].

use std::ffi::{c_char, c_float, c_int, c_void, CStr, CString};
use std::path::Path;

use super::{InferenceBackend, ModelHandle, OutputBuffer};

#[link(name = "llama_bridge")]
extern "C" {
    fn llama_load_model(path: *const c_char) -> *mut c_void;
    fn llama_free_model(handle: *mut c_void);
    fn llama_generate(
        handle: *mut c_void,
        prompt: *const c_char,
        max_tokens: c_int,
        temperature: c_float,
    ) -> *mut c_char;
    fn llama_free_string(text: *mut c_char);
    fn llama_get_error() -> *const c_char;
}

/// Inference backend backed by the llama.cpp bridge.
///
/// The bridge serializes internally; this type is stateless and cheap to
/// share.
#[derive(Debug, Default)]
pub struct LlamaBridgeBackend;

impl LlamaBridgeBackend {
    /// Create a bridge backend.
    pub fn new() -> Self {
        Self
    }
}

impl InferenceBackend for LlamaBridgeBackend {
    fn load_model(&self, path: &Path) -> Option<ModelHandle> {
        // A NUL inside the path cannot be represented in C; treat it as a
        // load failure rather than panicking.
        let c_path = CString::new(path.to_string_lossy().as_bytes()).ok()?;
        let raw = unsafe { llama_load_model(c_path.as_ptr()) };
        if raw.is_null() {
            None
        } else {
            Some(ModelHandle(raw as usize))
        }
    }

    fn free_model(&self, handle: ModelHandle) {
        unsafe { llama_free_model(handle.0 as *mut c_void) };
    }

    fn generate(
        &self,
        handle: &ModelHandle,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Option<OutputBuffer> {
        let c_prompt = CString::new(prompt.as_bytes()).ok()?;
        let raw = unsafe {
            llama_generate(
                handle.0 as *mut c_void,
                c_prompt.as_ptr(),
                max_tokens as c_int,
                temperature,
            )
        };
        if raw.is_null() {
            None
        } else {
            Some(OutputBuffer(raw as usize))
        }
    }

    fn buffer_text(&self, buffer: &OutputBuffer) -> String {
        let raw = buffer.0 as *const c_char;
        unsafe { CStr::from_ptr(raw) }
            .to_string_lossy()
            .into_owned()
    }

    fn free_buffer(&self, buffer: OutputBuffer) {
        unsafe { llama_free_string(buffer.0 as *mut c_char) };
    }

    fn last_error(&self) -> Option<String> {
        let raw = unsafe { llama_get_error() };
        if raw.is_null() {
            return None;
        }
        let message = unsafe { CStr::from_ptr(raw) }.to_string_lossy();
        if message.is_empty() {
            None
        } else {
            Some(message.into_owned())
        }
    }
}
