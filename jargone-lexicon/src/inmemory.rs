//! In-memory lexicon store.
//!
//! [`InMemoryLexicon`] keeps entries in a `Vec` ordered by id behind a
//! `tokio::sync::RwLock`. It is suitable for development, tests and offline
//! use of the CLI.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::entry::{LexiconEntry, LexiconMatch, SeedEntry, validate};
use crate::error::Result;
use crate::fuzzy::{best_match, same_name};
use crate::store::LexiconStore;

#[derive(Debug, Default)]
struct State {
    entries: Vec<LexiconEntry>,
    next_id: i64,
}

impl State {
    fn insert(&mut self, name: &str, definition: &str) -> LexiconEntry {
        self.next_id += 1;
        let now = Utc::now();
        let entry = LexiconEntry {
            id: self.next_id,
            name: name.to_string(),
            definition: definition.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.entries.push(entry.clone());
        entry
    }
}

/// A lexicon held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryLexicon {
    state: RwLock<State>,
}

impl InMemoryLexicon {
    /// Create a new empty lexicon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry in id order.
    pub async fn entries(&self) -> Vec<LexiconEntry> {
        self.state.read().await.entries.clone()
    }
}

#[async_trait]
impl LexiconStore for InMemoryLexicon {
    fn backend(&self) -> &str {
        "InMemory"
    }

    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn bulk_seed_if_empty(&self, entries: &[SeedEntry]) -> Result<usize> {
        for entry in entries {
            validate(&entry.name, &entry.definition)?;
        }

        let mut state = self.state.write().await;
        if !state.entries.is_empty() {
            debug!(existing = state.entries.len(), "lexicon already seeded, skipping");
            return Ok(0);
        }

        let mut inserted = 0;
        for entry in entries {
            if state.entries.iter().any(|e| same_name(&e.name, &entry.name)) {
                continue;
            }
            state.insert(&entry.name, &entry.definition);
            inserted += 1;
        }

        info!(inserted, "seeded lexicon");
        Ok(inserted)
    }

    async fn fuzzy_lookup(&self, word: &str) -> Result<Option<LexiconMatch>> {
        let state = self.state.read().await;
        Ok(best_match(word, &state.entries).map(LexiconMatch::from))
    }

    async fn upsert(&self, name: &str, definition: &str) -> Result<LexiconEntry> {
        validate(name, definition)?;
        let mut state = self.state.write().await;
        if let Some(existing) = state.entries.iter_mut().find(|e| same_name(&e.name, name)) {
            existing.definition = definition.to_string();
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }
        Ok(state.insert(name, definition))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.state.read().await.entries.len())
    }

    async fn names(&self) -> Result<Vec<String>> {
        Ok(self.state.read().await.entries.iter().map(|e| e.name.clone()).collect())
    }
}
