//! # jargone-rag
//!
//! Chunk indexing and vector retrieval for Jargone.
//!
//! ## Overview
//!
//! Documents are cut into overlapping character windows by the
//! [`ChunkIndexer`], embedded by an [`EmbeddingProvider`] and stored in a
//! [`VectorIndex`]. At query time the [`Retriever`] embeds the input text and
//! returns the closest passages.
//!
//! - [`InMemoryVectorIndex`] - cosine search in memory, for tests and offline use
//! - `QdrantVectorIndex` (feature `qdrant`) - Qdrant over gRPC
//! - `OpenAIEmbeddingProvider` (feature `openai`) - OpenAI-compatible embeddings
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jargone_rag::{InMemoryVectorIndex, RetrievalConfig, Retriever};
//!
//! let retriever = Retriever::builder()
//!     .config(RetrievalConfig::builder().dimensions(384).build()?)
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_index(Arc::new(InMemoryVectorIndex::new()))
//!     .build()?;
//!
//! for passage in retriever.retrieve("what is a subnet?").await? {
//!     println!("{:.3} {}", passage.score, passage.text);
//! }
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "qdrant")]
pub mod qdrant;
pub mod retriever;
pub mod vectorstore;

pub use chunking::{ChunkIndexer, window_bounds};
pub use config::{RetrievalConfig, RetrievalConfigBuilder};
pub use document::{
    ChunkPayload, DocumentChunk, FieldMatch, FieldValue, IndexPoint, PointId, RetrievalResult,
    SearchFilter,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorIndex;
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorIndex;
pub use retriever::{Retriever, RetrieverBuilder};
pub use vectorstore::VectorIndex;
