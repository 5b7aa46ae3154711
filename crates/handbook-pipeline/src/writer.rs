//! Writing phase: one oracle call per task, strictly in plan order.

use futures_util::stream::{self, Stream};
use handbook_core::progress::SECTION_SEPARATOR;
use handbook_core::{context_window, GenerationPolicy, RunId, Snapshot, Task, TaskList};
use tracing::{debug, error, info};

use crate::error::{OracleError, PipelineError};
use crate::oracle::SharedOracle;
use crate::prompts;

/// Writes a planned handbook section by section.
#[derive(Clone)]
pub struct SectionWriter {
    oracle: SharedOracle,
    policy: GenerationPolicy,
}

impl SectionWriter {
    /// Create a writer over the given oracle.
    pub fn new(oracle: SharedOracle, policy: GenerationPolicy) -> Self {
        Self { oracle, policy }
    }

    /// Start a run over `tasks`.
    ///
    /// Nothing is sent to the oracle until the returned [`Generation`] is
    /// polled past its first snapshot.
    pub fn write(&self, instruction: impl Into<String>, tasks: TaskList) -> Generation {
        Generation {
            run_id: RunId::generate(),
            oracle: self.oracle.clone(),
            policy: self.policy.clone(),
            instruction: instruction.into(),
            plan: tasks.render(),
            tasks,
            document: String::new(),
            completed: 0,
            state: State::Planned,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Plan is ready; the initial snapshot has not been handed out.
    Planned,
    Writing,
    Finished,
}

/// One in-progress handbook.
///
/// A pull-based, non-restartable sequence of [`Snapshot`]s: the first has
/// `completed == 0` and an empty document, then one follows each written
/// section. [`next_snapshot`](Self::next_snapshot) returns `None` once the
/// plan is exhausted or after an error has been yielded. Dropping the run
/// stops further oracle calls.
pub struct Generation {
    run_id: RunId,
    oracle: SharedOracle,
    policy: GenerationPolicy,
    instruction: String,
    plan: String,
    tasks: TaskList,
    document: String,
    completed: usize,
    state: State,
}

impl Generation {
    /// Identifier used in this run's log lines.
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// The plan being executed.
    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    /// Everything written so far.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Sections written so far.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Advance by one step.
    ///
    /// An oracle failure is yielded once and ends the sequence; the document
    /// keeps every section appended before it.
    pub async fn next_snapshot(&mut self) -> Option<Result<Snapshot, PipelineError>> {
        match self.state {
            State::Finished => None,
            State::Planned => {
                self.state = State::Writing;
                info!(run_id = %self.run_id, total = self.tasks.len(), "Plan ready, starting sections");
                Some(Ok(self.snapshot()))
            }
            State::Writing => {
                let Some(task) = self.tasks.get(self.completed).cloned() else {
                    self.state = State::Finished;
                    info!(
                        run_id = %self.run_id,
                        sections = self.completed,
                        words = handbook_core::word_count(&self.document),
                        "Handbook complete"
                    );
                    return None;
                };

                match self.write_section(&task).await {
                    Ok(section) => {
                        self.document.push_str(&section);
                        self.document.push_str(SECTION_SEPARATOR);
                        self.completed += 1;
                        info!(
                            run_id = %self.run_id,
                            completed = self.completed,
                            total = self.tasks.len(),
                            section_words = handbook_core::word_count(&section),
                            "Section written"
                        );
                        Some(Ok(self.snapshot()))
                    }
                    Err(e) => {
                        self.state = State::Finished;
                        error!(
                            run_id = %self.run_id,
                            completed = self.completed,
                            total = self.tasks.len(),
                            error = %e,
                            "Section failed, halting run"
                        );
                        Some(Err(e))
                    }
                }
            }
        }
    }

    /// Adapt the run into a [`Stream`] of snapshots.
    pub fn into_stream(self) -> impl Stream<Item = Result<Snapshot, PipelineError>> + Send {
        stream::unfold(self, |mut run| async move {
            run.next_snapshot().await.map(|item| (item, run))
        })
    }

    /// Drive the run to the end and return the finished document, trimmed.
    pub async fn finish(mut self) -> Result<String, PipelineError> {
        while let Some(snapshot) = self.next_snapshot().await {
            snapshot?;
        }
        Ok(self.document.trim().to_string())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.completed, self.tasks.len(), self.document.clone())
    }

    async fn write_section(&self, task: &Task) -> Result<String, PipelineError> {
        let window = context_window(&self.document, self.policy.window_words);
        let prompt = prompts::section_prompt(
            &self.instruction,
            &self.plan,
            &window,
            task.description(),
            &self.policy,
        );
        debug!(
            run_id = %self.run_id,
            step = self.completed + 1,
            prompt_len = prompt.len(),
            window_words = handbook_core::word_count(&window),
            "Requesting section"
        );

        let section = self
            .oracle
            .complete_blocking(&prompt, &self.policy.section_options())
            .await?;
        if section.trim().is_empty() {
            return Err(OracleError::EmptyResponse.into());
        }
        Ok(section)
    }
}
