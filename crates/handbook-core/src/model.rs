//! Completion request options.

use serde::{Deserialize, Serialize};

/// Default output token cap for one completion call.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Options for a single completion call.
///
/// This is provider-agnostic; adapters translate it into whatever the
/// backing API expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Maximum tokens the model may produce.
    pub max_output_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// Optional system preamble sent ahead of the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_preamble: Option<String>,
}

impl CompletionOptions {
    /// Create options with the given token cap and temperature.
    pub fn new(max_output_tokens: u32, temperature: f32) -> Self {
        Self {
            max_output_tokens,
            temperature,
            system_preamble: None,
        }
    }

    /// Builder method to set the system preamble.
    pub fn with_system_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.system_preamble = Some(preamble.into());
        self
    }
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE)
    }
}
