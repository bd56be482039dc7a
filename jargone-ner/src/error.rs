//! Error types for the `jargone-ner` crate.

use thiserror::Error;

/// Errors that can occur while recognising entities.
#[derive(Debug, Error)]
pub enum NerError {
    /// The tagging model could not be loaded or reached at startup.
    #[error("NER model unavailable ({tagger}): {message}")]
    ModelLoad {
        /// The tagger that failed to initialise.
        tagger: String,
        /// A description of the failure.
        message: String,
    },

    /// Tagging a single input failed.
    #[error("Tagging failed ({tagger}): {message}")]
    Tagging {
        /// The tagger that produced the error.
        tagger: String,
        /// A description of the failure.
        message: String,
    },

    /// The tagger did not answer within its deadline.
    #[error("Tagging timed out ({tagger})")]
    Timeout {
        /// The tagger that timed out.
        tagger: String,
    },
}

impl NerError {
    /// Whether the failure is transient and the call may be retried.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// A convenience result type for NER operations.
pub type Result<T> = std::result::Result<T, NerError>;
