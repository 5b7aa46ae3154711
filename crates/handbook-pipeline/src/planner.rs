//! Planning phase: instruction plus context into an ordered task list.

use handbook_core::{GenerationPolicy, TaskList};
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::oracle::SharedOracle;
use crate::prompts;

/// Decomposes a writing instruction into bounded writing tasks.
#[derive(Clone)]
pub struct Planner {
    oracle: SharedOracle,
    policy: GenerationPolicy,
}

impl Planner {
    /// Create a planner over the given oracle.
    pub fn new(oracle: SharedOracle, policy: GenerationPolicy) -> Self {
        Self { oracle, policy }
    }

    /// The policy embedded in planning prompts.
    pub fn policy(&self) -> &GenerationPolicy {
        &self.policy
    }

    /// Produce a task list with exactly one oracle call.
    ///
    /// `context` may be empty. An oracle response with no usable lines
    /// yields an empty [`TaskList`] rather than an error; callers decide
    /// what an empty plan means.
    pub async fn plan(&self, instruction: &str, context: &str) -> Result<TaskList, PipelineError> {
        if instruction.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "instruction must not be empty".to_string(),
            ));
        }

        let prompt = prompts::plan_prompt(instruction, context, &self.policy);
        info!(
            instruction_len = instruction.len(),
            context_len = context.len(),
            prompt_len = prompt.len(),
            "Requesting plan"
        );

        let response = self
            .oracle
            .complete_blocking(&prompt, &self.policy.plan_options())
            .await?;
        debug!(response_len = response.len(), "Plan response received");

        let tasks = TaskList::parse(&response);
        if tasks.is_empty() {
            warn!("Planner response contained no usable lines");
        } else {
            info!(
                tasks = tasks.len(),
                estimated_words = tasks.estimated_words(),
                "Plan created"
            );
        }
        Ok(tasks)
    }
}
