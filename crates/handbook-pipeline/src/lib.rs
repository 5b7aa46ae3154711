//! Handbook generation pipeline.
//!
//! Two phases run against a [`CompletionOracle`]:
//!
//! 1. [`Planner`] turns an instruction plus retrieved context into an ordered
//!    [`TaskList`](handbook_core::TaskList) with one oracle call.
//! 2. [`SectionWriter`] walks the plan one task at a time, feeding each call
//!    the instruction, the whole plan and a bounded tail of what has been
//!    written, and yields a [`Snapshot`](handbook_core::Snapshot) after each
//!    section.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use handbook_core::GenerationPolicy;
//! use handbook_pipeline::{HandbookGenerator, SharedOracle};
//!
//! async fn run(oracle: SharedOracle) -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = HandbookGenerator::new(oracle, GenerationPolicy::default());
//!     let mut run = generator
//!         .generate("Create a handbook on backup strategies", "")
//!         .await?;
//!
//!     while let Some(snapshot) = run.next_snapshot().await {
//!         let snapshot = snapshot?;
//!         eprintln!("{}", snapshot.header());
//!     }
//!     Ok(())
//! }
//! ```

mod chat;
mod error;
mod generator;
mod oracle;
mod planner;
pub mod prompts;
mod retrieval;
mod routing;
mod store;
mod writer;

#[cfg(test)]
mod test_support;

// Re-export main types
pub use chat::{DocumentChat, NO_DOCUMENTS_CONTEXT};
pub use error::{OracleError, PipelineError, RetrievalError};
pub use generator::{gather_context, HandbookGenerator};
pub use oracle::{CompletionOracle, FragmentStream, SharedOracle};
pub use planner::Planner;
pub use retrieval::{RetrievalMode, Retriever, SharedRetriever};
pub use routing::is_handbook_request;
pub use store::InMemoryStore;
pub use writer::{Generation, SectionWriter};
