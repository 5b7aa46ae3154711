//! HTTP client for the chat completions endpoint.

use std::fmt;

use async_trait::async_trait;
use futures_util::StreamExt;
use handbook_core::CompletionOptions;
use handbook_pipeline::{CompletionOracle, FragmentStream, OracleError};
use reqwest::StatusCode;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::error::LlmError;
use crate::sse::{SseBuffer, SseEvent};
use crate::types::{ApiErrorBody, ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse};

/// Default provider endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";

/// Default model.
pub const DEFAULT_MODEL: &str = "grok-4-1-fast-non-reasoning";

/// Fragments buffered between the body reader and the consumer.
const STREAM_CHANNEL_CAPACITY: usize = 64;

/// Receiving side of a streamed completion.
pub type FragmentReceiver = ReceiverStream<Result<String, LlmError>>;

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct ChatClient {
    inner: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Create a client for the default provider and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Builder method to point at another provider.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Builder method to set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Model used for every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Provider base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run one completion and return the whole text.
    pub async fn chat(&self, prompt: &str, options: &CompletionOptions) -> Result<String, LlmError> {
        let request = ChatCompletionRequest::single_turn(&self.model, prompt, options);
        let response = self.send(&request).await?;

        let body = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;
        let content = parsed
            .first_content()
            .ok_or_else(|| LlmError::Malformed("response has no choices".to_string()))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion usage"
            );
        }
        Ok(content.to_string())
    }

    /// Start a streamed completion.
    ///
    /// The HTTP status is checked before returning; everything after that
    /// arrives through the receiver. A background task reads the body and
    /// stops when the receiver is dropped.
    pub async fn chat_stream(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<FragmentReceiver, LlmError> {
        let request = ChatCompletionRequest::single_turn(&self.model, prompt, options).streaming();
        let response = self.send(&request).await?;

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(pump_events(response, tx));
        Ok(ReceiverStream::new(rx))
    }

    async fn send(&self, request: &ChatCompletionRequest) -> Result<reqwest::Response, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        info!(
            url = %url,
            model = %self.model,
            stream = request.stream,
            max_tokens = request.max_tokens,
            "Sending completion request"
        );

        let response = self
            .inner
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = ApiErrorBody::message_from(&body);
        warn!(status = status.as_u16(), message = %message, "Completion request failed");

        if status == StatusCode::TOO_MANY_REQUESTS {
            Err(LlmError::RateLimited(message))
        } else {
            Err(LlmError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Read SSE frames off the body and forward text fragments.
async fn pump_events(response: reqwest::Response, tx: mpsc::Sender<Result<String, LlmError>>) {
    let mut body = response.bytes_stream();
    let mut buffer = SseBuffer::default();

    while let Some(chunk) = body.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tx.send(Err(LlmError::Http(e))).await;
                return;
            }
        };
        buffer.push(&bytes);

        while let Some(event) = buffer.next_event() {
            if let Some(event) = event {
                if !forward(&tx, event).await {
                    return;
                }
            }
        }
    }

    if let Some(event) = buffer.flush() {
        forward(&tx, event).await;
    }
}

/// Returns false once the stream is over or the receiver is gone.
async fn forward(tx: &mpsc::Sender<Result<String, LlmError>>, event: SseEvent) -> bool {
    let data = match event {
        SseEvent::Done => {
            debug!("Stream finished");
            return false;
        }
        SseEvent::Data(data) => data,
    };

    match serde_json::from_str::<ChatCompletionChunk>(&data) {
        Ok(ChatCompletionChunk {
            error: Some(error), ..
        }) => {
            warn!(message = %error.message, "Provider aborted stream");
            let _ = tx.send(Err(LlmError::Stream(error.message))).await;
            false
        }
        Ok(chunk) => match chunk.delta_text() {
            Some(text) => tx.send(Ok(text.to_string())).await.is_ok(),
            None => true,
        },
        Err(e) => {
            let _ = tx
                .send(Err(LlmError::Malformed(format!("bad stream chunk: {e}"))))
                .await;
            false
        }
    }
}

#[async_trait]
impl CompletionOracle for ChatClient {
    async fn complete_blocking(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, OracleError> {
        Ok(self.chat(prompt, options).await?)
    }

    async fn complete_streaming(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<FragmentStream, OracleError> {
        let fragments = self.chat_stream(prompt, options).await?;
        Ok(fragments
            .map(|fragment| fragment.map_err(OracleError::from))
            .boxed())
    }
}
