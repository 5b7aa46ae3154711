//! Plan-then-write facade.

use handbook_core::{GenerationPolicy, TaskList};
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::oracle::SharedOracle;
use crate::planner::Planner;
use crate::retrieval::{RetrievalMode, Retriever};
use crate::writer::{Generation, SectionWriter};

/// Runs planning and then hands back the writing sequence.
#[derive(Clone)]
pub struct HandbookGenerator {
    planner: Planner,
    writer: SectionWriter,
}

impl HandbookGenerator {
    /// Create a generator where both phases share one oracle and policy.
    pub fn new(oracle: SharedOracle, policy: GenerationPolicy) -> Self {
        Self {
            planner: Planner::new(oracle.clone(), policy.clone()),
            writer: SectionWriter::new(oracle, policy),
        }
    }

    /// The policy applied to both phases.
    pub fn policy(&self) -> &GenerationPolicy {
        self.planner.policy()
    }

    /// Run only the planning phase.
    pub async fn plan(&self, instruction: &str, context: &str) -> Result<TaskList, PipelineError> {
        self.policy().validate()?;
        self.planner.plan(instruction, context).await
    }

    /// Plan, then return the writing sequence ready to be polled.
    ///
    /// An empty plan is [`PipelineError::PlanningFailure`] and no section is
    /// requested.
    pub async fn generate(
        &self,
        instruction: &str,
        context: &str,
    ) -> Result<Generation, PipelineError> {
        let tasks = self.plan(instruction, context).await?;
        if tasks.is_empty() {
            return Err(PipelineError::PlanningFailure);
        }
        let run = self.writer.write(instruction, tasks);
        info!(run_id = %run.run_id(), sections = run.tasks().len(), "Generation started");
        Ok(run)
    }
}

/// Fetch planning context for `instruction`.
///
/// Retrieval failures are logged and treated as "no context"; planning
/// still goes ahead.
pub async fn gather_context(retriever: &dyn Retriever, instruction: &str) -> String {
    match retriever.query(instruction, RetrievalMode::Hybrid).await {
        Ok(context) => {
            debug!(context_len = context.len(), "Retrieved planning context");
            context
        }
        Err(e) if e.is_empty_index() => {
            debug!("No documents indexed, planning without context");
            String::new()
        }
        Err(e) => {
            warn!(error = %e, "Retrieval failed, planning without context");
            String::new()
        }
    }
}
