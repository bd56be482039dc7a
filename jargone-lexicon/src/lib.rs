//! # jargone-lexicon
//!
//! Fuzzy-matched jargon lexicon for Jargone.
//!
//! ## Overview
//!
//! A lexicon maps canonical term names to definitions. Lookups tolerate a
//! single typo: the input is lowercased and compared by Levenshtein distance
//! against every stored name, and the closest entry within one edit wins.
//!
//! - [`LexiconStore`] is the storage seam
//! - [`InMemoryLexicon`] keeps everything in memory
//! - `PgLexiconStore` (feature `postgres`) persists to PostgreSQL via sqlx
//! - [`LexiconResolver`] bootstraps a store and answers lookups
//! - [`seed`] provides the built-in table and a CSV loader
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jargone_lexicon::{InMemoryLexicon, LexiconResolver, seed};
//!
//! let resolver = LexiconResolver::new(Arc::new(InMemoryLexicon::new()));
//! resolver.bootstrap(&seed::default_seed()).await?;
//!
//! if let Some(hit) = resolver.lookup("kubernets").await? {
//!     println!("{}: {}", hit.name, hit.definition);
//! }
//! ```

pub mod entry;
pub mod error;
pub mod fuzzy;
pub mod inmemory;
pub mod resolver;
pub mod seed;
pub mod store;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use entry::{LexiconEntry, LexiconMatch, SeedEntry};
pub use error::{LexiconError, Result};
pub use inmemory::InMemoryLexicon;
pub use resolver::LexiconResolver;
pub use store::LexiconStore;

#[cfg(feature = "postgres")]
pub use postgres::PgLexiconStore;
