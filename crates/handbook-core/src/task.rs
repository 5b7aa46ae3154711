//! Task and TaskList types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One planned unit of writing work.
///
/// A task is a single line of planner output, kept verbatim. Its position in
/// the [`TaskList`] is its ordinal; the description usually carries a target
/// word count ("Word Count: 700 words"), which is advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    description: String,
}

impl Task {
    /// Create a new Task from a line of planner output.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    /// The task line as produced by the planner.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Read the advisory target word count, if the line states one.
    ///
    /// Looks for the first number after a "word count" label, case-insensitive.
    /// Returns `None` for lines that do not follow the requested grammar; such
    /// lines are still valid tasks.
    pub fn target_words(&self) -> Option<u32> {
        let lower = self.description.to_ascii_lowercase();
        let start = lower.find("word count")? + "word count".len();
        let digits: String = lower[start..]
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit() || *c == ',')
            .filter(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Ordered, immutable plan for one generation run.
///
/// Insertion order is execution order is document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    /// Parse raw planner output: one task per non-blank line, trimmed,
    /// in the order received.
    pub fn parse(raw: &str) -> Self {
        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(Task::new)
            .collect()
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when planning produced nothing usable.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Get a task by position.
    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    /// Iterate tasks in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// Render the whole plan as text, one task per line.
    pub fn render(&self) -> String {
        self.tasks
            .iter()
            .map(Task::description)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Sum of the advisory word counts the tasks state.
    pub fn estimated_words(&self) -> u64 {
        self.tasks
            .iter()
            .filter_map(Task::target_words)
            .map(u64::from)
            .sum()
    }
}

impl FromIterator<Task> for TaskList {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
