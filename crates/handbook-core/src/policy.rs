//! Generation policy: the externally configurable knobs of a run.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{CompletionOptions, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE};
use crate::window::DEFAULT_WINDOW_WORDS;

/// Length and budget policy for one handbook.
///
/// Defaults follow the reference policy: at least 30 sections of 600-800
/// words each, aiming at a 20,000 word document, with a 3000 word tail
/// window fed back into each section call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationPolicy {
    /// Total target document length in words.
    pub total_words: u32,

    /// Minimum number of tasks the planner is asked for.
    pub min_tasks: u32,

    /// Lower bound of the per-section word target.
    pub section_words_min: u32,

    /// Upper bound of the per-section word target.
    pub section_words_max: u32,

    /// Word budget of the tail window fed back to the writer.
    pub window_words: usize,

    /// Output token cap for the planning call.
    pub plan_max_tokens: u32,

    /// Output token cap for each section call.
    pub section_max_tokens: u32,

    /// Sampling temperature for both phases.
    pub temperature: f32,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            total_words: 20_000,
            min_tasks: 30,
            section_words_min: 600,
            section_words_max: 800,
            window_words: DEFAULT_WINDOW_WORDS,
            plan_max_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            section_max_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl GenerationPolicy {
    /// Builder method to set the total target length.
    pub fn with_total_words(mut self, words: u32) -> Self {
        self.total_words = words;
        self
    }

    /// Builder method to set the minimum task count.
    pub fn with_min_tasks(mut self, tasks: u32) -> Self {
        self.min_tasks = tasks;
        self
    }

    /// Builder method to set the per-section word range.
    pub fn with_section_words(mut self, min: u32, max: u32) -> Self {
        self.section_words_min = min;
        self.section_words_max = max;
        self
    }

    /// Builder method to set the context window budget.
    pub fn with_window_words(mut self, words: usize) -> Self {
        self.window_words = words;
        self
    }

    /// Builder method to set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Check that the policy can produce a plan at all.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.total_words == 0 {
            return Err(CoreError::InvalidPolicy(
                "total_words must be positive".to_string(),
            ));
        }
        if self.min_tasks == 0 {
            return Err(CoreError::InvalidPolicy(
                "min_tasks must be positive".to_string(),
            ));
        }
        if self.section_words_min == 0 || self.section_words_min > self.section_words_max {
            return Err(CoreError::InvalidPolicy(format!(
                "section word range {}-{} is empty",
                self.section_words_min, self.section_words_max
            )));
        }
        if self.plan_max_tokens == 0 || self.section_max_tokens == 0 {
            return Err(CoreError::InvalidPolicy(
                "output token caps must be positive".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(CoreError::InvalidPolicy(format!(
                "temperature {} is outside 0.0-2.0",
                self.temperature
            )));
        }
        Ok(())
    }

    /// Options for the single planning call.
    pub fn plan_options(&self) -> CompletionOptions {
        CompletionOptions::new(self.plan_max_tokens, self.temperature)
    }

    /// Options for each section call.
    pub fn section_options(&self) -> CompletionOptions {
        CompletionOptions::new(self.section_max_tokens, self.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_reference_policy() {
        let policy = GenerationPolicy::default();
        assert_eq!(policy.total_words, 20_000);
        assert_eq!(policy.min_tasks, 30);
        assert_eq!((policy.section_words_min, policy.section_words_max), (600, 800));
        assert_eq!(policy.window_words, 3000);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let policy = GenerationPolicy::default().with_section_words(900, 500);
        assert!(matches!(policy.validate(), Err(CoreError::InvalidPolicy(_))));
    }

    #[test]
    fn test_validate_rejects_zero_tasks() {
        let policy = GenerationPolicy::default().with_min_tasks(0);
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_zero_window_is_allowed() {
        let policy = GenerationPolicy::default().with_window_words(0);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let policy: GenerationPolicy =
            serde_json::from_str(r#"{"min_tasks": 25, "total_words": 15000}"#).unwrap();
        assert_eq!(policy.min_tasks, 25);
        assert_eq!(policy.total_words, 15_000);
        assert_eq!(policy.section_words_max, 800);
    }

    #[test]
    fn test_options_follow_policy() {
        let policy = GenerationPolicy::default().with_temperature(0.3);
        assert_eq!(policy.plan_options().temperature, 0.3);
        assert_eq!(policy.section_options().max_output_tokens, 4096);
        assert!(policy.section_options().system_preamble.is_none());
    }
}
