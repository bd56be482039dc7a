//! Vector index trait for storing and searching embeddings.

use async_trait::async_trait;

use crate::document::{IndexPoint, RetrievalResult, SearchFilter};
use crate::error::Result;

/// A storage backend for embeddings with cosine similarity search.
///
/// Upserting an existing id replaces its vector and payload entirely.
///
/// # Example
///
/// ```rust,ignore
/// use jargone_rag::{InMemoryVectorIndex, VectorIndex};
///
/// let index = InMemoryVectorIndex::new();
/// index.ensure_collection("documents", 1536).await?;
/// index.upsert("documents", &points).await?;
/// let results = index.search("documents", &query, 5, None).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// A short backend name for logs and errors.
    fn backend(&self) -> &str;

    /// Create a cosine collection of the given dimension. No-op if it exists.
    async fn ensure_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a collection and all its points.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Insert or replace points by id.
    async fn upsert(&self, collection: &str, points: &[IndexPoint]) -> Result<()>;

    /// Return at most `limit` points ordered by descending similarity to `vector`,
    /// restricted to payloads accepted by `filter`.
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<RetrievalResult>>;
}
