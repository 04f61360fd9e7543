//! Common value types used throughout the engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Hard ceiling on tokens generated per call in the current engine.
///
/// Requests above this are clamped, never rejected. Not user-configurable
/// upward until the native layer grows proper sampling control.
pub const MAX_TOKENS_CEILING: u32 = 128;

/// Temperature the engine currently pins every generation to. The value a
/// caller supplies in [`GenerationParameters`] is accepted but inert.
pub const ENGINE_TEMPERATURE: f32 = 0.7;

/// Parameters for a single text generation call.
///
/// `temperature` and `top_p` are carried for forward compatibility: the
/// native layer does not honor them yet (temperature is pinned to
/// [`ENGINE_TEMPERATURE`], top-p is not passed through).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationParameters {
    /// Maximum number of tokens to generate. Clamped at runtime to
    /// [`MAX_TOKENS_CEILING`].
    pub max_tokens: u32,
    /// Sampling temperature (currently inert).
    pub temperature: f32,
    /// Top-p sampling threshold (currently inert).
    pub top_p: f32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_tokens: 256,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

impl GenerationParameters {
    /// The token budget actually issued to the native backend.
    pub fn effective_max_tokens(&self) -> u32 {
        self.max_tokens.min(MAX_TOKENS_CEILING)
    }
}

/// Result of a successful generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    /// The generated text.
    pub text: String,
    /// Wall-clock time the call took, including any model load.
    pub generation_time: Duration,
    /// Number of tokens generated. Always 0 until the native layer exposes
    /// token accounting.
    pub tokens_generated: u32,
}
