//! Wire types for the OpenAI-compatible chat completions API.

use handbook_core::{ChatMessage, CompletionOptions};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request Types
// ============================================================================

/// Request body for POST /chat/completions.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier.
    pub model: String,

    /// Conversation, system preamble first when present.
    pub messages: Vec<ChatMessage>,

    /// Output token cap.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// Ask for server-sent events instead of one JSON body.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

impl ChatCompletionRequest {
    /// Build a single-turn request for `prompt`.
    pub fn single_turn(model: &str, prompt: &str, options: &CompletionOptions) -> Self {
        Self {
            model: model.to_string(),
            messages: ChatMessage::single_turn(options.system_preamble.as_deref(), prompt),
            max_tokens: options.max_output_tokens,
            temperature: options.temperature,
            stream: false,
        }
    }

    /// Builder method to request streaming.
    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Non-streaming response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    pub choices: Vec<Choice>,

    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// Text of the first choice. A null content is returned as `""`.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_deref().unwrap_or(""))
    }
}

/// One candidate completion.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,

    pub message: ResponseMessage,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Assistant message inside a [`Choice`].
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}

/// Token accounting.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,

    #[serde(default)]
    pub completion_tokens: u32,

    #[serde(default)]
    pub total_tokens: u32,
}

// ============================================================================
// Streaming Types
// ============================================================================

/// One `data:` payload of a streaming response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,

    /// Set when the provider aborts after the stream has started.
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

impl ChatCompletionChunk {
    /// New text carried by this chunk, if any.
    ///
    /// Role-only and empty deltas yield `None`.
    pub fn delta_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Delta,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}

// ============================================================================
// Error Types
// ============================================================================

/// Error envelope returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,

    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

impl ApiErrorBody {
    /// Best-effort human-readable message for an error body.
    pub fn message_from(body: &str) -> String {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => parsed.error.message,
            Err(_) if body.trim().is_empty() => "no response body".to_string(),
            Err(_) => body.trim().chars().take(500).collect(),
        }
    }
}
