//! In-memory vector index using cosine similarity.
//!
//! [`InMemoryVectorIndex`] keeps each collection as a `Vec` of points behind a
//! `tokio::sync::RwLock`. It is suitable for development, testing and
//! small-scale use.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{IndexPoint, RetrievalResult, SearchFilter};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

const BACKEND: &str = "InMemory";

#[derive(Debug)]
struct Collection {
    dimensions: usize,
    points: Vec<IndexPoint>,
}

/// An in-memory vector index using cosine similarity for search.
///
/// Points keep their first-insertion order, so equal scores come back in that
/// order.
///
/// # Example
///
/// ```rust,ignore
/// use jargone_rag::{InMemoryVectorIndex, VectorIndex};
///
/// let index = InMemoryVectorIndex::new();
/// index.ensure_collection("documents", 384).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorIndex {
    /// Create a new empty in-memory index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points in a collection, or `None` if it does not exist.
    pub async fn point_count(&self, collection: &str) -> Option<usize> {
        self.collections.read().await.get(collection).map(|c| c.points.len())
    }
}

fn missing(collection: &str) -> RagError {
    RagError::VectorStoreError {
        backend: BACKEND.to_string(),
        message: format!("collection '{collection}' does not exist"),
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    fn backend(&self) -> &str {
        BACKEND
    }

    async fn ensure_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(existing) = collections.get(name) {
            if existing.dimensions != dimensions {
                return Err(RagError::VectorStoreError {
                    backend: BACKEND.to_string(),
                    message: format!(
                        "collection '{name}' exists with dimension {}, requested {dimensions}",
                        existing.dimensions
                    ),
                });
            }
            return Ok(());
        }
        collections.insert(name.to_string(), Collection { dimensions, points: Vec::new() });
        debug!(collection = name, dimensions, "created in-memory collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections.write().await.remove(name);
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: &[IndexPoint]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| missing(collection))?;

        for point in points {
            if point.vector.len() != store.dimensions {
                return Err(RagError::DimensionMismatch {
                    id: point.id.to_string(),
                    expected: store.dimensions,
                    actual: point.vector.len(),
                });
            }
        }

        for point in points {
            match store.points.iter_mut().find(|p| p.id == point.id) {
                Some(existing) => *existing = point.clone(),
                None => store.points.push(point.clone()),
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<RetrievalResult>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| missing(collection))?;

        if vector.len() != store.dimensions {
            return Err(RagError::DimensionMismatch {
                id: "query".to_string(),
                expected: store.dimensions,
                actual: vector.len(),
            });
        }

        let mut scored: Vec<RetrievalResult> = store
            .points
            .iter()
            .filter(|point| filter.is_none_or(|f| f.accepts(&point.payload)))
            .map(|point| {
                let score = cosine_similarity(&point.vector, vector);
                RetrievalResult::from_payload(point.id.to_string(), point.payload.clone(), score)
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ChunkPayload, PointId};

    fn point(id: &str, vector: Vec<f32>, source: &str) -> IndexPoint {
        IndexPoint {
            id: PointId::from(id),
            vector,
            payload: ChunkPayload { source_name: source.into(), text: id.into(), ..Default::default() },
        }
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [0.3, -0.2, 0.9];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&v, &[0.0, 0.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn upsert_rejects_wrong_dimension_without_writing() {
        let index = InMemoryVectorIndex::new();
        index.ensure_collection("c", 2).await.unwrap();
        let err = index
            .upsert("c", &[point("a", vec![1.0, 0.0], "s"), point("b", vec![1.0], "s")])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 1, .. }));
        assert_eq!(index.point_count("c").await, Some(0));
    }

    #[tokio::test]
    async fn upsert_replaces_existing_point() {
        let index = InMemoryVectorIndex::new();
        index.ensure_collection("c", 2).await.unwrap();
        index.upsert("c", &[point("a", vec![1.0, 0.0], "old")]).await.unwrap();
        index.upsert("c", &[point("a", vec![0.0, 1.0], "new")]).await.unwrap();

        let results = index.search("c", &[0.0, 1.0], 10, None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source_name, "new");
        assert!(results[0].score > 0.99);
    }

    #[tokio::test]
    async fn search_applies_filter() {
        let index = InMemoryVectorIndex::new();
        index.ensure_collection("c", 2).await.unwrap();
        index
            .upsert("c", &[point("a", vec![1.0, 0.0], "wiki"), point("b", vec![1.0, 0.1], "mail")])
            .await
            .unwrap();

        let filter = SearchFilter::new().must_match("source_name", "mail");
        let results = index.search("c", &[1.0, 0.0], 10, Some(&filter)).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "b");
    }

    #[tokio::test]
    async fn ensure_collection_is_idempotent_but_checks_dimension() {
        let index = InMemoryVectorIndex::new();
        index.ensure_collection("c", 3).await.unwrap();
        index.ensure_collection("c", 3).await.unwrap();
        assert!(index.ensure_collection("c", 4).await.is_err());
    }

    #[tokio::test]
    async fn search_on_missing_collection_fails() {
        let index = InMemoryVectorIndex::new();
        let err = index.search("nope", &[1.0], 1, None).await.unwrap_err();
        assert!(matches!(err, RagError::VectorStoreError { .. }));
    }
}
