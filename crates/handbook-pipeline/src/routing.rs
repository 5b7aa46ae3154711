//! Deciding whether a free-form message asks for a handbook.

/// Phrases that mark a message as a handbook request.
const HANDBOOK_TRIGGERS: &[&str] = &[
    "generate a handbook",
    "create a handbook",
    "write a handbook",
    "generate handbook",
    "create handbook",
    "write handbook",
];

/// True when `message` should start a generation run instead of a chat
/// answer. Matching is case-insensitive and looks for a trigger anywhere
/// in the message.
pub fn is_handbook_request(message: &str) -> bool {
    let lower = message.to_lowercase();
    HANDBOOK_TRIGGERS.iter().any(|phrase| lower.contains(phrase))
}
