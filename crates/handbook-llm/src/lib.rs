//! Chat completions client for OpenAI-compatible providers.
//!
//! [`ChatClient`] speaks the `/chat/completions` wire format (xAI by default)
//! and implements [`CompletionOracle`](handbook_pipeline::CompletionOracle),
//! so it can be handed straight to the planner, writer and document chat.
//!
//! # Example
//!
//! ```rust,no_run
//! use handbook_core::CompletionOptions;
//! use handbook_llm::ChatClient;
//!
//! async fn ask() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ChatClient::new(std::env::var("XAI_API_KEY")?);
//!     let text = client
//!         .chat("Summarize the 3-2-1 backup rule.", &CompletionOptions::default())
//!         .await?;
//!     println!("{text}");
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod sse;
mod types;

// Re-export main types
pub use client::{ChatClient, FragmentReceiver, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::LlmError;
pub use types::{
    ApiErrorBody, ApiErrorDetail, ChatCompletionChunk, ChatCompletionRequest,
    ChatCompletionResponse, Choice, ChunkChoice, Delta, ResponseMessage, Usage,
};
