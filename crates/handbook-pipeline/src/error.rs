//! Error types for the generation pipeline.

use handbook_core::CoreError;
use thiserror::Error;

/// Failures reported by a completion oracle.
///
/// The pipeline never retries or papers over these; they end the run.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Network or transport failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider refused the call because of rate limiting.
    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    /// The provider answered with something that could not be used.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The provider returned no text where text was required.
    #[error("Empty response from oracle")]
    EmptyResponse,
}

/// Failures reported by a retrieval collaborator.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Nothing has been indexed yet.
    #[error("No documents indexed")]
    Empty,

    /// Backend-specific failure.
    #[error("Retrieval backend error: {0}")]
    Backend(String),
}

impl RetrievalError {
    /// True when the store simply has nothing to search yet.
    pub fn is_empty_index(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Errors that end a planning or writing run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Planning produced zero usable tasks.
    #[error("Planning produced no tasks")]
    PlanningFailure,

    /// The completion oracle failed.
    #[error("Completion oracle failed: {0}")]
    Oracle(#[from] OracleError),

    /// Retrieval failed where the caller required it.
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    /// Caller supplied unusable input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Domain-level validation failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl PipelineError {
    /// True when the error came from the oracle transport.
    pub fn is_oracle_failure(&self) -> bool {
        matches!(self, Self::Oracle(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_error_wraps() {
        let err: PipelineError = OracleError::EmptyResponse.into();
        assert!(err.is_oracle_failure());
        assert!(err.to_string().contains("Empty response"));
    }

    #[test]
    fn test_planning_failure_display() {
        assert_eq!(
            PipelineError::PlanningFailure.to_string(),
            "Planning produced no tasks"
        );
        assert!(!PipelineError::PlanningFailure.is_oracle_failure());
    }

    #[test]
    fn test_wrapped_messages_are_capitalized() {
        let err: PipelineError = OracleError::Transport("connection reset".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Completion oracle failed: Transport error: connection reset"
        );

        let err: PipelineError = RetrievalError::Empty.into();
        assert_eq!(err.to_string(), "Retrieval failed: No documents indexed");
    }

    #[test]
    fn test_empty_index_is_distinguished_from_backend_failure() {
        assert!(RetrievalError::Empty.is_empty_index());
        assert!(!RetrievalError::Backend("timeout".to_string()).is_empty_index());
    }
}
