//! Error types for the `jargone-lexicon` crate.

use thiserror::Error;

/// Errors that can occur in lexicon operations.
///
/// A lookup that finds nothing is not an error; it returns `Ok(None)`.
#[derive(Debug, Error)]
pub enum LexiconError {
    /// The backing store could not be reached or rejected a query.
    #[error("Lexicon store error ({backend}): {message}")]
    StoreError {
        /// The store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// Creating or migrating the schema failed.
    #[error("Lexicon schema error ({backend}): {message}")]
    SchemaError {
        /// The store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The seed source could not be read or parsed.
    #[error("Seed error: {0}")]
    SeedError(String),

    /// An entry failed validation before being written.
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),
}

/// A convenience result type for lexicon operations.
pub type Result<T> = std::result::Result<T, LexiconError>;
