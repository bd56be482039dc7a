//! Error types for the `jargone-rag` crate.

use thiserror::Error;

/// Errors that can occur in chunking, embedding and retrieval.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A remote call did not answer within its time budget.
    #[error("Timeout ({component}): {message}")]
    Timeout {
        /// The provider or backend that timed out.
        component: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index backend.
    #[error("Vector index error ({backend}): {message}")]
    VectorStoreError {
        /// The vector index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A chunk handed to the index carries no embedding.
    #[error("Chunk '{id}' has no embedding")]
    MissingEmbedding {
        /// The effective point id of the offending chunk.
        id: String,
    },

    /// An embedding length does not match the collection dimension.
    #[error("Chunk '{id}' has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        /// The effective point id of the offending chunk.
        id: String,
        /// The configured dimension.
        expected: usize,
        /// The length of the supplied vector.
        actual: usize,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Entity extraction failed while chunking.
    #[error(transparent)]
    Recognizer(#[from] jargone_ner::NerError),
}

impl RagError {
    /// Whether the failure came from a remote dependency that may recover.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::VectorStoreError { .. } | Self::EmbeddingError { .. })
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
