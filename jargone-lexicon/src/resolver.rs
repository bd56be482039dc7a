//! Lexicon resolver: bootstrap plus fuzzy lookup over any [`LexiconStore`].

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::entry::{LexiconEntry, LexiconMatch, SeedEntry};
use crate::error::Result;
use crate::store::LexiconStore;

/// Resolves words to lexicon definitions.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use jargone_lexicon::{InMemoryLexicon, LexiconResolver, seed};
///
/// let resolver = LexiconResolver::new(Arc::new(InMemoryLexicon::new()));
/// resolver.bootstrap(&seed::default_seed()).await?;
/// let hit = resolver.lookup("kubernets").await?;
/// ```
#[derive(Clone)]
pub struct LexiconResolver {
    store: Arc<dyn LexiconStore>,
}

impl LexiconResolver {
    /// Create a resolver over the given store.
    pub fn new(store: Arc<dyn LexiconStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn LexiconStore> {
        &self.store
    }

    /// Ensure the schema exists and seed it when empty.
    ///
    /// Returns the number of entries inserted. Safe to call on every startup.
    #[instrument(skip_all, fields(backend = self.store.backend(), seed_rows = seed.len()))]
    pub async fn bootstrap(&self, seed: &[SeedEntry]) -> Result<usize> {
        self.store.ensure_schema().await?;
        let inserted = self.store.bulk_seed_if_empty(seed).await?;
        info!(inserted, "lexicon ready");
        Ok(inserted)
    }

    /// Look up the entry within one edit of `word`. Absence is `Ok(None)`.
    pub async fn lookup(&self, word: &str) -> Result<Option<LexiconMatch>> {
        let hit = self.store.fuzzy_lookup(word).await?;
        debug!(word, matched = hit.as_ref().map(|m| m.name.as_str()), "lexicon lookup");
        Ok(hit)
    }

    /// Every name the resolver can return, in id order.
    pub async fn names(&self) -> Result<Vec<String>> {
        self.store.names().await
    }

    /// Add or replace a definition.
    pub async fn define(&self, name: &str, definition: &str) -> Result<LexiconEntry> {
        self.store.upsert(name, definition).await
    }
}

impl std::fmt::Debug for LexiconResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LexiconResolver").field("backend", &self.store.backend()).finish()
    }
}
