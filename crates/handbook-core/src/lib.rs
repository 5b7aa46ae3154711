//! Handbook Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Async runtimes
//! - Any particular language model provider
//!
//! All types here describe a single "plan then write" generation run:
//! the task list produced by planning, the generation policy, the progress
//! snapshots emitted while writing, and the sliding context window.

pub mod chat;
pub mod error;
pub mod ids;
pub mod model;
pub mod policy;
pub mod progress;
pub mod task;
pub mod window;

// Re-export commonly used types
pub use chat::{ChatMessage, ChatRole};
pub use error::CoreError;
pub use ids::RunId;
pub use model::CompletionOptions;
pub use policy::GenerationPolicy;
pub use progress::Snapshot;
pub use task::{Task, TaskList};
pub use window::{context_window, truncate, word_count};
