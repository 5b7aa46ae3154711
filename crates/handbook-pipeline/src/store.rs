//! In-memory keyword-scored document store.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::RetrievalError;
use crate::retrieval::{RetrievalMode, Retriever};

/// Default chunk size in words.
pub const DEFAULT_CHUNK_WORDS: usize = 1200;

/// Default overlap between consecutive chunks in words.
pub const DEFAULT_OVERLAP_WORDS: usize = 100;

/// Default number of chunks returned per query.
pub const DEFAULT_TOP_K: usize = 5;

/// Terms shorter than this are ignored when scoring.
const MIN_TERM_LEN: usize = 3;

/// A small local [`Retriever`] for plain-text documents.
///
/// Documents are split into overlapping word chunks. Queries rank chunks by
/// how often the question's terms occur in them. Every [`RetrievalMode`] uses
/// the same keyword scoring here; semantic modes need an external store.
#[derive(Debug)]
pub struct InMemoryStore {
    chunks: RwLock<Vec<String>>,
    chunk_words: usize,
    overlap_words: usize,
    top_k: usize,
}

impl InMemoryStore {
    /// Create an empty store with default chunking.
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(Vec::new()),
            chunk_words: DEFAULT_CHUNK_WORDS,
            overlap_words: DEFAULT_OVERLAP_WORDS,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set chunk size and overlap, in words.
    ///
    /// Overlap is clamped below the chunk size.
    pub fn with_chunking(mut self, chunk_words: usize, overlap_words: usize) -> Self {
        self.chunk_words = chunk_words.max(1);
        self.overlap_words = overlap_words.min(self.chunk_words - 1);
        self
    }

    /// Set how many chunks a query returns.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Number of indexed chunks.
    pub async fn chunk_count(&self) -> usize {
        self.chunks.read().await.len()
    }

    fn split(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let step = self.chunk_words - self.overlap_words;

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + self.chunk_words).min(words.len());
            chunks.push(words[start..end].join(" "));
            if end == words.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TERM_LEN)
        .map(str::to_lowercase)
        .collect()
}

fn score(chunk: &str, query_terms: &BTreeSet<String>) -> usize {
    chunk
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .filter(|word| query_terms.contains(&word.to_lowercase()))
        .count()
}

#[async_trait]
impl Retriever for InMemoryStore {
    async fn insert(&self, text: &str) -> Result<(), RetrievalError> {
        let new_chunks = self.split(text);
        let added = new_chunks.len();
        let mut chunks = self.chunks.write().await;
        chunks.extend(new_chunks);
        info!(added, total = chunks.len(), "Indexed document");
        Ok(())
    }

    async fn query(&self, question: &str, mode: RetrievalMode) -> Result<String, RetrievalError> {
        let chunks = self.chunks.read().await;
        if chunks.is_empty() {
            return Err(RetrievalError::Empty);
        }

        let query_terms = terms(question);
        let mut ranked: Vec<(usize, &String)> = chunks
            .iter()
            .map(|chunk| (score(chunk, &query_terms), chunk))
            .filter(|(hits, _)| *hits > 0)
            .collect();
        // Stable sort keeps document order among equal scores.
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        let selected: Vec<&str> = ranked
            .iter()
            .take(self.top_k)
            .map(|(_, chunk)| chunk.as_str())
            .collect();

        debug!(
            mode = %mode,
            terms = query_terms.len(),
            matched = ranked.len(),
            returned = selected.len(),
            "Answered retrieval query"
        );
        Ok(selected.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_is_an_error() {
        let store = InMemoryStore::new();
        let result = store.query("anything", RetrievalMode::Hybrid).await;
        assert!(matches!(result, Err(RetrievalError::Empty)));
    }

    #[tokio::test]
    async fn test_chunking_with_overlap() {
        let store = InMemoryStore::new().with_chunking(4, 1);
        store.insert("a b c d e f g h i j").await.unwrap();

        // 0..4, 3..7, 6..10
        assert_eq!(store.chunk_count().await, 3);
        let chunks = store.chunks.read().await;
        assert_eq!(chunks[0], "a b c d");
        assert_eq!(chunks[1], "d e f g");
        assert_eq!(chunks[2], "g h i j");
    }

    #[tokio::test]
    async fn test_query_ranks_by_term_hits() {
        let store = InMemoryStore::new().with_chunking(6, 0).with_top_k(1);
        store
            .insert("tape rotation schedules keep weekly copies \
                     snapshots replicate volumes snapshots every hour")
            .await
            .unwrap();

        let context = store
            .query("How do snapshots work?", RetrievalMode::Hybrid)
            .await
            .unwrap();
        assert!(context.contains("snapshots replicate"));
        assert!(!context.contains("tape"));
    }

    #[tokio::test]
    async fn test_query_without_matches_returns_empty_context() {
        let store = InMemoryStore::new();
        store.insert("completely unrelated gardening notes").await.unwrap();

        let context = store.query("kubernetes", RetrievalMode::Naive).await.unwrap();
        assert!(context.is_empty());
    }
}
