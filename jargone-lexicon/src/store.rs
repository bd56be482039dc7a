//! Lexicon store trait.

use async_trait::async_trait;

use crate::entry::{LexiconEntry, LexiconMatch, SeedEntry};
use crate::error::Result;

/// A persistent key/definition store with fuzzy lookup.
///
/// Implementations share one matching rule, [`best_match`](crate::fuzzy::best_match):
/// lowercase Levenshtein distance below 2, ties broken by ascending id.
///
/// # Example
///
/// ```rust,ignore
/// use jargone_lexicon::{InMemoryLexicon, LexiconStore, SeedEntry};
///
/// let store = InMemoryLexicon::new();
/// store.ensure_schema().await?;
/// store.bulk_seed_if_empty(&[SeedEntry::new("baobab", "a tree")]).await?;
/// let hit = store.fuzzy_lookup("baoba").await?;
/// ```
#[async_trait]
pub trait LexiconStore: Send + Sync {
    /// A short backend name for logs and errors.
    fn backend(&self) -> &str;

    /// Create the backing schema. No-op if it already exists.
    async fn ensure_schema(&self) -> Result<()>;

    /// Insert every seed row in one batch, but only when the store is empty.
    ///
    /// Returns the number of rows inserted; `0` when the store already held
    /// entries. Running it twice never duplicates rows.
    async fn bulk_seed_if_empty(&self, entries: &[SeedEntry]) -> Result<usize>;

    /// Find the entry closest to `word`, if any lies within one edit.
    async fn fuzzy_lookup(&self, word: &str) -> Result<Option<LexiconMatch>>;

    /// Insert an entry, or replace the definition of the entry with the same
    /// case-insensitive name. Refreshes `updated_at`.
    async fn upsert(&self, name: &str, definition: &str) -> Result<LexiconEntry>;

    /// Number of stored entries.
    async fn count(&self) -> Result<usize>;

    /// Every canonical name, in id order.
    async fn names(&self) -> Result<Vec<String>>;
}
