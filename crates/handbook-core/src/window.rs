//! Sliding tail window over the document written so far.
//!
//! Word counts stand in for token counts: words are whitespace-delimited and
//! no tokenizer is involved, so the budget is approximate.

use std::borrow::Cow;

/// Default word budget of the context window.
pub const DEFAULT_WINDOW_WORDS: usize = 3000;

/// Prefix marking that earlier text was cut off.
pub const CONTINUATION_MARKER: &str = "...";

/// Window shown to the writer before any section exists.
pub const BEGINNING_MARKER: &str = "(Beginning of document)";

/// Number of whitespace-delimited words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Keep at most the trailing `max_words` words of `full_text`.
///
/// Text within budget is returned unchanged. Otherwise the result is the
/// continuation marker followed by exactly the last `max_words` words joined
/// by single spaces. A zero budget on non-empty text yields the bare marker.
pub fn truncate(full_text: &str, max_words: usize) -> Cow<'_, str> {
    let total = word_count(full_text);
    if total <= max_words {
        return Cow::Borrowed(full_text);
    }
    if max_words == 0 {
        return Cow::Borrowed(CONTINUATION_MARKER);
    }

    let tail: Vec<&str> = full_text.split_whitespace().skip(total - max_words).collect();
    Cow::Owned(format!("{} {}", CONTINUATION_MARKER, tail.join(" ")))
}

/// The window the writer sees for the next section.
///
/// An empty document yields [`BEGINNING_MARKER`], which keeps "nothing
/// written yet" distinct from a window emptied by truncation.
pub fn context_window(document: &str, max_words: usize) -> Cow<'_, str> {
    if document.is_empty() {
        Cow::Borrowed(BEGINNING_MARKER)
    } else {
        truncate(document, max_words)
    }
}
