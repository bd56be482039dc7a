//! Fixed-window chunking of raw documents.
//!
//! [`ChunkIndexer`] cuts a document into overlapping character windows and
//! tags each window with the entities recognised inside it. Embedding and
//! persistence happen later, in the [`Retriever`](crate::Retriever).

use std::sync::Arc;

use jargone_ner::EntityRecognizer;
use serde_json::Map;
use tracing::debug;

use crate::document::DocumentChunk;
use crate::error::{RagError, Result};

/// Default window length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 8000;

/// Default overlap between consecutive windows in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// Character ranges `[start, end)` of every window over a text of `len` chars.
///
/// Window `k` starts at `k * (size - overlap)` and runs for `size` characters,
/// clipped at `len`. Windowing stops once a start reaches `len`, so the last
/// windows may be shorter than `size`. An empty text has no windows.
///
/// Callers must ensure `overlap < size`.
pub fn window_bounds(len: usize, size: usize, overlap: usize) -> Vec<(usize, usize)> {
    let step = size.saturating_sub(overlap);
    if step == 0 {
        return Vec::new();
    }

    let mut windows = Vec::new();
    let mut start = 0;
    while start < len {
        windows.push((start, (start + size).min(len)));
        start += step;
    }
    windows
}

/// Splits documents into overlapping windows annotated with named entities.
///
/// Offsets count Unicode scalar values, so a multi-byte character is never
/// split across windows.
///
/// # Example
///
/// ```rust,ignore
/// use jargone_rag::ChunkIndexer;
///
/// let indexer = ChunkIndexer::new(8000, 100, recognizer)?;
/// let chunks = indexer.chunkize(&content, "handbook.md").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ChunkIndexer {
    chunk_size: usize,
    chunk_overlap: usize,
    recognizer: Arc<EntityRecognizer>,
}

impl ChunkIndexer {
    /// Create a new `ChunkIndexer`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(
        chunk_size: usize,
        chunk_overlap: usize,
        recognizer: Arc<EntityRecognizer>,
    ) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap, recognizer })
    }

    /// Create an indexer with the default window size and overlap.
    pub fn with_defaults(recognizer: Arc<EntityRecognizer>) -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, chunk_overlap: DEFAULT_CHUNK_OVERLAP, recognizer }
    }

    /// The window length in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The overlap between consecutive windows in characters.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Cut `content` into chunks attributed to `source_name`.
    ///
    /// Each chunk gets its window index as `chunk_id`, its character length as
    /// `token_count`, and the entity texts found in that window alone. No
    /// embedding or id is set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Recognizer`] if entity extraction fails on any window.
    pub async fn chunkize(&self, content: &str, source_name: &str) -> Result<Vec<DocumentChunk>> {
        let chars: Vec<char> = content.chars().collect();
        let windows = window_bounds(chars.len(), self.chunk_size, self.chunk_overlap);

        let mut chunks = Vec::with_capacity(windows.len());
        for (chunk_id, (start, end)) in windows.into_iter().enumerate() {
            let text: String = chars[start..end].iter().collect();
            let named_entities = self.recognizer.extract_texts(&text).await?;

            chunks.push(DocumentChunk {
                token_count: Some(end - start),
                chunk_id: Some(chunk_id as u64),
                named_entities,
                metadata: Map::new(),
                embedding: None,
                id: None,
                source_name: source_name.to_string(),
                text,
            });
        }

        debug!(source = source_name, chunk_count = chunks.len(), "chunkized document");
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use jargone_ner::HeuristicTagger;

    use super::*;

    fn recognizer() -> Arc<EntityRecognizer> {
        Arc::new(EntityRecognizer::new(Arc::new(HeuristicTagger::new())))
    }

    #[test]
    fn windows_overlap_and_cover_the_text() {
        assert_eq!(window_bounds(10, 4, 1), vec![(0, 4), (3, 7), (6, 10), (9, 10)]);
        assert_eq!(window_bounds(3, 4, 1), vec![(0, 3)]);
        assert!(window_bounds(0, 4, 1).is_empty());
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(matches!(ChunkIndexer::new(4, 4, recognizer()), Err(RagError::ConfigError(_))));
        assert!(matches!(ChunkIndexer::new(0, 0, recognizer()), Err(RagError::ConfigError(_))));
    }

    #[tokio::test]
    async fn chunkize_numbers_windows_and_counts_chars() {
        let indexer = ChunkIndexer::new(5, 2, recognizer()).unwrap();
        let chunks = indexer.chunkize("héllo wörld", "greeting").await.unwrap();

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].text, "héllo");
        assert_eq!(chunks[1].text, "lo wö");
        assert_eq!(chunks[2].text, "wörld");
        assert_eq!(chunks[3].text, "ld");
        assert_eq!(chunks[3].token_count, Some(2));
        assert!(chunks.iter().enumerate().all(|(i, c)| c.chunk_id == Some(i as u64)));
        assert!(chunks.iter().all(|c| c.source_name == "greeting" && c.embedding.is_none()));
    }

    #[tokio::test]
    async fn empty_content_yields_no_chunks() {
        let indexer = ChunkIndexer::with_defaults(recognizer());
        assert!(indexer.chunkize("", "empty").await.unwrap().is_empty());
    }
}
