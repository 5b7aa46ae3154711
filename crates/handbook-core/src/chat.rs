//! Messages sent to a chat-style completion provider.

use serde::{Deserialize, Serialize};

/// Who a message is from, in wire spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// One `{role, content}` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Instructions placed ahead of the prompt.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// The prompt itself.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Messages for a stateless one-shot call: the optional preamble, then
    /// the prompt. No history is carried between calls.
    pub fn single_turn(system_preamble: Option<&str>, prompt: &str) -> Vec<Self> {
        system_preamble
            .map(Self::system)
            .into_iter()
            .chain(std::iter::once(Self::user(prompt)))
            .collect()
    }
}
