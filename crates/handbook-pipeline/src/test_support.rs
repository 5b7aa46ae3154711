//! Scripted oracle and retriever for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use handbook_core::CompletionOptions;

use crate::error::{OracleError, RetrievalError};
use crate::oracle::{CompletionOracle, FragmentStream};
use crate::retrieval::{RetrievalMode, Retriever};

/// Oracle that replays a fixed list of responses in order and records
/// every prompt it was given.
pub(crate) struct ScriptedOracle {
    script: Mutex<VecDeque<Result<String, OracleError>>>,
    prompts: Mutex<Vec<String>>,
    options: Mutex<Vec<CompletionOptions>>,
}

impl ScriptedOracle {
    pub(crate) fn new(script: Vec<Result<String, OracleError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
            options: Mutex::new(Vec::new()),
        }
    }

    /// Script of `n` distinct successful sections.
    pub(crate) fn sections(n: usize) -> Self {
        Self::new((1..=n).map(|i| Ok(format!("Section {i} body."))).collect())
    }

    pub(crate) fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn options(&self) -> Vec<CompletionOptions> {
        self.options.lock().unwrap().clone()
    }

    fn next(&self, prompt: &str, options: &CompletionOptions) -> Result<String, OracleError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.options.lock().unwrap().push(options.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(OracleError::Transport("script exhausted".to_string())))
    }
}

#[async_trait]
impl CompletionOracle for ScriptedOracle {
    async fn complete_blocking(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, OracleError> {
        self.next(prompt, options)
    }

    async fn complete_streaming(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<FragmentStream, OracleError> {
        let text = self.next(prompt, options)?;
        let fragments: Vec<Result<String, OracleError>> = text
            .split_inclusive(' ')
            .map(|fragment| Ok(fragment.to_string()))
            .collect();
        Ok(stream::iter(fragments).boxed())
    }
}

/// Retriever that always answers with the same text or the same failure.
pub(crate) struct FixedRetriever {
    answer: Result<String, Option<String>>,
    pub(crate) queries: Mutex<Vec<(String, RetrievalMode)>>,
}

impl FixedRetriever {
    pub(crate) fn answering(answer: &str) -> Self {
        Self::with(Ok(answer.to_string()))
    }

    /// Behaves like a store with nothing indexed.
    pub(crate) fn empty() -> Self {
        Self::with(Err(None))
    }

    /// Fails with a backend error.
    pub(crate) fn broken(message: &str) -> Self {
        Self::with(Err(Some(message.to_string())))
    }

    fn with(answer: Result<String, Option<String>>) -> Self {
        Self {
            answer,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Retriever for FixedRetriever {
    async fn insert(&self, _text: &str) -> Result<(), RetrievalError> {
        Ok(())
    }

    async fn query(&self, question: &str, mode: RetrievalMode) -> Result<String, RetrievalError> {
        self.queries
            .lock()
            .unwrap()
            .push((question.to_string(), mode));
        match &self.answer {
            Ok(answer) => Ok(answer.clone()),
            Err(None) => Err(RetrievalError::Empty),
            Err(Some(message)) => Err(RetrievalError::Backend(message.clone())),
        }
    }
}
