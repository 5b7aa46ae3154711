//! Retrieval collaborator seam.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// Shared handle to a retriever.
///
/// Construct one per process (or per test) and pass it to whatever needs it.
pub type SharedRetriever = Arc<dyn Retriever>;

/// How a retriever should blend its signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    /// Plain chunk similarity.
    Naive,
    /// Entity-local neighbourhood.
    Local,
    /// Corpus-wide themes.
    Global,
    /// Keyword and semantic signals blended.
    #[default]
    Hybrid,
    /// Hybrid plus plain chunk similarity.
    Mix,
}

impl RetrievalMode {
    /// Lowercase name used on the command line and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Naive => "naive",
            Self::Local => "local",
            Self::Global => "global",
            Self::Hybrid => "hybrid",
            Self::Mix => "mix",
        }
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrievalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "naive" => Ok(Self::Naive),
            "local" => Ok(Self::Local),
            "global" => Ok(Self::Global),
            "hybrid" => Ok(Self::Hybrid),
            "mix" => Ok(Self::Mix),
            other => Err(format!(
                "unknown retrieval mode '{other}' (expected naive, local, global, hybrid or mix)"
            )),
        }
    }
}

/// A knowledge store that supplies context for planning and chat.
///
/// The pipeline treats whatever [`query`](Self::query) returns as opaque text.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Index a document's text.
    async fn insert(&self, text: &str) -> Result<(), RetrievalError>;

    /// Return context relevant to `question`.
    async fn query(&self, question: &str, mode: RetrievalMode) -> Result<String, RetrievalError>;
}
