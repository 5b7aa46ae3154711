//! Completion oracle seam.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use handbook_core::CompletionOptions;

use crate::error::OracleError;

/// Incremental text fragments from a streaming completion.
pub type FragmentStream = BoxStream<'static, Result<String, OracleError>>;

/// Shared handle to an oracle.
pub type SharedOracle = Arc<dyn CompletionOracle>;

/// A language model that turns a prompt into text.
///
/// Blocking and streaming are separate capabilities so each call site states
/// which one it relies on. The planner and writer only use
/// [`complete_blocking`](Self::complete_blocking).
#[async_trait]
pub trait CompletionOracle: Send + Sync {
    /// Run one completion and return the whole response text.
    ///
    /// A provider that answers without content returns an empty string.
    async fn complete_blocking(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, OracleError>;

    /// Run one completion and yield text fragments as they are produced.
    async fn complete_streaming(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<FragmentStream, OracleError>;
}
