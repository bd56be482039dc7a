//! Embedding-backed retrieval over a vector index.
//!
//! The [`Retriever`] pairs an [`EmbeddingProvider`] with a [`VectorIndex`]
//! collection. It embeds queries, searches the index, and writes embedded
//! chunks back to it.
//!
//! # Example
//!
//! ```rust,ignore
//! use jargone_rag::{InMemoryVectorIndex, RetrievalConfig, Retriever};
//!
//! let retriever = Retriever::builder()
//!     .config(RetrievalConfig::builder().dimensions(1536).build()?)
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_index(Arc::new(InMemoryVectorIndex::new()))
//!     .build()?;
//!
//! retriever.add(&chunks).await?;
//! let passages = retriever.retrieve("how do I rotate the wpa2-psk?").await?;
//! ```

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::config::RetrievalConfig;
use crate::document::{DocumentChunk, IndexPoint, RetrievalResult, SearchFilter};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// Embeds, searches and stores chunks in one vector index collection.
///
/// The collection is created lazily on first use, once per `Retriever`.
/// Construct one via [`Retriever::builder()`].
pub struct Retriever {
    config: RetrievalConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_index: Arc<dyn VectorIndex>,
    ready: OnceCell<()>,
}

impl Retriever {
    /// Create a new [`RetrieverBuilder`].
    pub fn builder() -> RetrieverBuilder {
        RetrieverBuilder::default()
    }

    /// Return a reference to the retrieval configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Return a reference to the vector index.
    pub fn vector_index(&self) -> &Arc<dyn VectorIndex> {
        &self.vector_index
    }

    /// Create the collection if this retriever has not done so yet.
    ///
    /// Concurrent callers wait for the same initialisation. A failed attempt
    /// is retried by the next caller.
    pub async fn ensure_ready(&self) -> Result<()> {
        self.ready
            .get_or_try_init(|| async {
                let collection = &self.config.collection;
                self.vector_index
                    .ensure_collection(collection, self.config.dimensions)
                    .await
                    .inspect_err(|e| {
                        error!(collection = %collection, error = %e, "failed to prepare collection");
                    })?;
                info!(
                    collection = %collection,
                    dimensions = self.config.dimensions,
                    backend = self.vector_index.backend(),
                    "vector collection ready"
                );
                Ok::<(), RagError>(())
            })
            .await
            .map(|_| ())
    }

    /// Embed a single text.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embedding_provider.embed(text).await.inspect_err(|e| {
            error!(provider = self.embedding_provider.name(), error = %e, "embedding failed");
        })
    }

    /// Embed a batch of texts, one vector per input.
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let vectors = self.embedding_provider.embed_batch(texts).await.inspect_err(|e| {
            error!(provider = self.embedding_provider.name(), error = %e, "batch embedding failed");
        })?;
        if vectors.len() != texts.len() {
            return Err(RagError::EmbeddingError {
                provider: self.embedding_provider.name().to_string(),
                message: format!("expected {} embeddings, got {}", texts.len(), vectors.len()),
            });
        }
        Ok(vectors)
    }

    /// Search the collection with a precomputed vector.
    pub async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<RetrievalResult>> {
        self.ensure_ready().await?;
        let collection = &self.config.collection;
        self.vector_index.search(collection, vector, limit, filter).await.inspect_err(|e| {
            error!(collection = %collection, error = %e, "vector search failed");
        })
    }

    /// Retrieve the passages most relevant to `query`.
    ///
    /// Embeds the query, searches for `top_k` results and, when a
    /// `similarity_threshold` is set, drops those scoring below it. An empty
    /// collection yields no passages.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievalResult>> {
        self.retrieve_filtered(query, None).await
    }

    /// Like [`retrieve`](Self::retrieve), restricted to payloads accepted by `filter`.
    pub async fn retrieve_filtered(
        &self,
        query: &str,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<RetrievalResult>> {
        let vector = self.embed(query).await?;
        let results = self.search(&vector, self.config.top_k, filter).await?;

        let passages: Vec<RetrievalResult> = match self.config.similarity_threshold {
            Some(threshold) => results.into_iter().filter(|r| r.score >= threshold).collect(),
            None => results,
        };

        debug!(passage_count = passages.len(), "retrieved passages");
        Ok(passages)
    }

    /// Store embedded chunks, returning their point ids in input order.
    ///
    /// The whole batch is validated before anything is written: every chunk
    /// must carry an embedding of the configured dimension.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::MissingEmbedding`] or [`RagError::DimensionMismatch`]
    /// for the first invalid chunk, in which case nothing is stored.
    pub async fn add(&self, chunks: &[DocumentChunk]) -> Result<Vec<String>> {
        let expected = self.config.dimensions;
        let mut points = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let id = chunk.point_id();
            let vector = chunk
                .embedding
                .as_ref()
                .ok_or_else(|| RagError::MissingEmbedding { id: id.to_string() })?;
            if vector.len() != expected {
                return Err(RagError::DimensionMismatch {
                    id: id.to_string(),
                    expected,
                    actual: vector.len(),
                });
            }
            points.push(IndexPoint { id, vector: vector.clone(), payload: chunk.payload() });
        }

        if points.is_empty() {
            return Ok(Vec::new());
        }

        self.ensure_ready().await?;
        let collection = &self.config.collection;
        self.vector_index.upsert(collection, &points).await.inspect_err(|e| {
            error!(collection = %collection, error = %e, "upsert failed");
        })?;

        let ids: Vec<String> = points.iter().map(|p| p.id.to_string()).collect();
        info!(collection = %collection, count = ids.len(), "stored chunks");
        Ok(ids)
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("config", &self.config)
            .field("embedding_provider", &self.embedding_provider.name())
            .field("vector_index", &self.vector_index.backend())
            .finish()
    }
}

/// Builder for constructing a [`Retriever`].
///
/// All fields are required. Call [`build()`](RetrieverBuilder::build) to
/// validate and produce the retriever.
#[derive(Default)]
pub struct RetrieverBuilder {
    config: Option<RetrievalConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_index: Option<Arc<dyn VectorIndex>>,
}

impl RetrieverBuilder {
    /// Set the retrieval configuration.
    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector index backend.
    pub fn vector_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.vector_index = Some(index);
        self
    }

    /// Build the [`Retriever`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a field is missing or the provider's
    /// dimension differs from the configured one.
    pub fn build(self) -> Result<Retriever> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_index = self
            .vector_index
            .ok_or_else(|| RagError::ConfigError("vector_index is required".to_string()))?;

        if embedding_provider.dimensions() != config.dimensions {
            return Err(RagError::ConfigError(format!(
                "embedding provider produces {} dimensions, collection expects {}",
                embedding_provider.dimensions(),
                config.dimensions
            )));
        }

        Ok(Retriever { config, embedding_provider, vector_index, ready: OnceCell::new() })
    }
}
