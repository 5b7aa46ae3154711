//! Progress snapshots emitted while a handbook is being written.

use serde::{Deserialize, Serialize};

use crate::window::word_count;

/// Paragraph separator appended after every section.
pub const SECTION_SEPARATOR: &str = "\n\n";

/// Full progress state after some number of sections.
///
/// Each snapshot supersedes the previous one entirely; it is not a delta.
/// Consumers can render any snapshot on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sections written so far.
    pub completed: usize,

    /// Sections in the plan.
    pub total: usize,

    /// Everything written so far, each section followed by a separator.
    pub document: String,
}

impl Snapshot {
    /// Create a new snapshot.
    pub fn new(completed: usize, total: usize, document: impl Into<String>) -> Self {
        Self {
            completed,
            total,
            document: document.into(),
        }
    }

    /// True once every planned section has been written.
    pub fn is_final(&self) -> bool {
        self.completed == self.total
    }

    /// Approximate length of the document so far.
    pub fn word_count(&self) -> usize {
        word_count(&self.document)
    }

    /// One-line progress header for display.
    pub fn header(&self) -> String {
        if self.is_final() {
            format!(
                "Handbook complete: {} words | {} sections",
                self.word_count(),
                self.total
            )
        } else {
            format!(
                "Generating handbook: section {}/{} | {} words so far",
                self.completed,
                self.total,
                self.word_count()
            )
        }
    }
}
