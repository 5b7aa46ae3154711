//! Question answering over indexed documents.

use handbook_core::{CompletionOptions, GenerationPolicy};
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::oracle::{FragmentStream, SharedOracle};
use crate::prompts::{self, CHAT_SYSTEM_PREAMBLE};
use crate::retrieval::{RetrievalMode, SharedRetriever};

/// Context used when retrieval has nothing to offer.
pub const NO_DOCUMENTS_CONTEXT: &str = "(No documents indexed yet. Index documents first.)";

/// Answers single questions from retrieved document context.
#[derive(Clone)]
pub struct DocumentChat {
    oracle: SharedOracle,
    retriever: SharedRetriever,
    mode: RetrievalMode,
    options: CompletionOptions,
}

impl DocumentChat {
    /// Create a chat over the given oracle and retriever.
    pub fn new(oracle: SharedOracle, retriever: SharedRetriever) -> Self {
        let policy = GenerationPolicy::default();
        Self {
            oracle,
            retriever,
            mode: RetrievalMode::default(),
            options: CompletionOptions::new(policy.section_max_tokens, policy.temperature)
                .with_system_preamble(CHAT_SYSTEM_PREAMBLE),
        }
    }

    /// Use a different retrieval mode.
    pub fn with_mode(mut self, mode: RetrievalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Use a different sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = temperature;
        self
    }

    /// Stream an answer to `question`.
    pub async fn answer_streaming(&self, question: &str) -> Result<FragmentStream, PipelineError> {
        let prompt = self.prompt(question).await?;
        Ok(self.oracle.complete_streaming(&prompt, &self.options).await?)
    }

    /// Answer `question` in one piece.
    pub async fn answer(&self, question: &str) -> Result<String, PipelineError> {
        let prompt = self.prompt(question).await?;
        Ok(self.oracle.complete_blocking(&prompt, &self.options).await?)
    }

    async fn prompt(&self, question: &str) -> Result<String, PipelineError> {
        if question.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "question must not be empty".to_string(),
            ));
        }

        let context = match self.retriever.query(question, self.mode).await {
            Ok(context) if !context.trim().is_empty() => context,
            Ok(_) => {
                debug!("Retrieval returned no matching chunks");
                NO_DOCUMENTS_CONTEXT.to_string()
            }
            Err(e) if e.is_empty_index() => {
                debug!("No documents indexed, answering without documents");
                NO_DOCUMENTS_CONTEXT.to_string()
            }
            Err(e) => {
                warn!(error = %e, "Retrieval failed, answering without documents");
                NO_DOCUMENTS_CONTEXT.to_string()
            }
        };

        info!(
            mode = %self.mode,
            question_len = question.len(),
            context_len = context.len(),
            "Answering question"
        );
        Ok(prompts::chat_prompt(&context, question))
    }
}
