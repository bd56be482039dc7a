//! Error types for the `jargone-explain` crate.
//!
//! Lower layers raise their own typed errors; this module folds them into the
//! handful of kinds a transport layer needs to pick a status code and a retry
//! policy. An entity without a definition, or a query without passages, is
//! never an error.

use std::fmt;

use jargone_lexicon::LexiconError;
use jargone_model::ModelError;
use jargone_ner::NerError;
use jargone_rag::RagError;
use thiserror::Error;

/// The pipeline step an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Entity recognition on the input text.
    Recognition,
    /// Lexicon lookups for recognised spans.
    Resolution,
    /// Passage retrieval from the vector index.
    Retrieval,
    /// The generative model call.
    Generation,
    /// Chunking, embedding and storing a saved document.
    Indexing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recognition => "recognition",
            Self::Resolution => "resolution",
            Self::Retrieval => "retrieval",
            Self::Generation => "generation",
            Self::Indexing => "indexing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which backing store failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// The relational lexicon store.
    Lexicon,
    /// The vector index holding document chunks.
    VectorIndex,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexicon => f.write_str("lexicon"),
            Self::VectorIndex => f.write_str("vector index"),
        }
    }
}

/// Errors surfaced by the explanation pipeline.
#[derive(Debug, Error)]
pub enum ExplainError {
    /// The recogniser, embedding provider or generative model failed.
    #[error("Model unavailable during {stage}: {message}")]
    ModelUnavailable {
        /// The step that failed.
        stage: Stage,
        /// A description of the failure.
        message: String,
    },

    /// The lexicon store or vector index could not serve the request.
    #[error("{store} store unavailable during {stage}: {message}")]
    StoreUnavailable {
        /// The store that failed.
        store: StoreKind,
        /// The step that failed.
        stage: Stage,
        /// A description of the failure.
        message: String,
    },

    /// The caller supplied something that cannot be processed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A remote dependency did not answer in time.
    #[error("Timed out during {stage}: {message}")]
    Timeout {
        /// The step that timed out.
        stage: Stage,
        /// A description of the failure.
        message: String,
    },

    /// The pipeline was assembled with invalid settings.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExplainError {
    /// Whether the caller may retry the same request.
    ///
    /// Timeouts and vector index failures qualify. Lexicon failures do not,
    /// since they are usually schema or connection setup problems.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::StoreUnavailable { store: StoreKind::VectorIndex, .. }
        )
    }

    /// Whether the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// The step the error came from, when it has one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::ModelUnavailable { stage, .. }
            | Self::StoreUnavailable { stage, .. }
            | Self::Timeout { stage, .. } => Some(*stage),
            Self::InvalidInput(_) | Self::Config(_) => None,
        }
    }

    pub(crate) fn from_ner(stage: Stage, err: NerError) -> Self {
        match err {
            NerError::Timeout { .. } => Self::Timeout { stage, message: err.to_string() },
            other => Self::ModelUnavailable { stage, message: other.to_string() },
        }
    }

    pub(crate) fn from_lexicon(stage: Stage, err: LexiconError) -> Self {
        match err {
            LexiconError::InvalidEntry(message) => Self::InvalidInput(message),
            other => Self::StoreUnavailable {
                store: StoreKind::Lexicon,
                stage,
                message: other.to_string(),
            },
        }
    }

    pub(crate) fn from_rag(stage: Stage, err: RagError) -> Self {
        match err {
            RagError::Timeout { .. } => Self::Timeout { stage, message: err.to_string() },
            RagError::EmbeddingError { .. } => {
                Self::ModelUnavailable { stage, message: err.to_string() }
            }
            RagError::VectorStoreError { .. } => Self::StoreUnavailable {
                store: StoreKind::VectorIndex,
                stage,
                message: err.to_string(),
            },
            RagError::MissingEmbedding { .. } | RagError::DimensionMismatch { .. } => {
                Self::InvalidInput(err.to_string())
            }
            RagError::ConfigError(message) => Self::Config(message),
            RagError::Recognizer(inner) => Self::from_ner(stage, inner),
        }
    }

    /// Map a storage failure for chunks whose vectors came from the embedding
    /// provider: a missing or misshapen vector is the provider's fault.
    pub(crate) fn from_provider_vectors(stage: Stage, err: RagError) -> Self {
        match err {
            RagError::MissingEmbedding { .. } | RagError::DimensionMismatch { .. } => {
                Self::ModelUnavailable {
                    stage,
                    message: format!("embedding provider returned unusable vectors: {err}"),
                }
            }
            other => Self::from_rag(stage, other),
        }
    }

    pub(crate) fn from_model(stage: Stage, err: ModelError) -> Self {
        match err {
            ModelError::Timeout { .. } => Self::Timeout { stage, message: err.to_string() },
            ModelError::Config(message) => Self::Config(message),
            other => Self::ModelUnavailable { stage, message: other.to_string() },
        }
    }
}

/// A convenience result type for explanation operations.
pub type Result<T> = std::result::Result<T, ExplainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_index_failures_are_retryable_lexicon_failures_are_not() {
        let vector = ExplainError::from_rag(
            Stage::Retrieval,
            RagError::VectorStoreError { backend: "Qdrant".into(), message: "down".into() },
        );
        assert!(vector.is_retryable());
        assert!(!vector.is_client_error());

        let lexicon = ExplainError::from_lexicon(
            Stage::Resolution,
            LexiconError::SchemaError { backend: "PostgreSQL".into(), message: "denied".into() },
        );
        assert!(matches!(lexicon, ExplainError::StoreUnavailable { store: StoreKind::Lexicon, .. }));
        assert!(!lexicon.is_retryable());
    }

    #[test]
    fn timeouts_keep_their_stage() {
        let err = ExplainError::from_model(
            Stage::Generation,
            ModelError::Timeout { provider: "OpenAI".into(), message: "60s".into() },
        );
        assert!(err.is_retryable());
        assert_eq!(err.stage(), Some(Stage::Generation));

        let err = ExplainError::from_ner(Stage::Recognition, NerError::Timeout { tagger: "remote".into() });
        assert!(matches!(err, ExplainError::Timeout { stage: Stage::Recognition, .. }));
    }

    #[test]
    fn batch_validation_failures_are_client_errors() {
        let err = ExplainError::from_rag(Stage::Indexing, RagError::MissingEmbedding { id: "doc_0".into() });
        assert!(err.is_client_error());
        assert_eq!(err.stage(), None);
    }

    #[test]
    fn bad_provider_vectors_are_model_failures() {
        let err = ExplainError::from_provider_vectors(
            Stage::Indexing,
            RagError::DimensionMismatch { id: "doc_0".into(), expected: 1536, actual: 1535 },
        );
        assert!(matches!(err, ExplainError::ModelUnavailable { stage: Stage::Indexing, .. }));
        assert!(!err.is_client_error());

        let err = ExplainError::from_provider_vectors(
            Stage::Indexing,
            RagError::VectorStoreError { backend: "qdrant".into(), message: "down".into() },
        );
        assert!(matches!(err, ExplainError::StoreUnavailable { store: StoreKind::VectorIndex, .. }));
    }

    #[test]
    fn recognizer_errors_inside_rag_map_to_model_unavailable() {
        let err = ExplainError::from_rag(
            Stage::Indexing,
            RagError::Recognizer(NerError::Tagging { tagger: "x".into(), message: "bad".into() }),
        );
        assert!(matches!(err, ExplainError::ModelUnavailable { stage: Stage::Indexing, .. }));
    }
}
