//! Data types for lexicon entries and lookups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LexiconError, Result};

/// A stored lexicon entry.
///
/// `name` is unique under case-insensitive comparison. `updated_at` is
/// refreshed whenever the entry is mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LexiconEntry {
    /// Auto-assigned primary key; lookups break ties by ascending id.
    pub id: i64,
    /// Canonical name of the term.
    pub name: String,
    /// Definition shown to the reader.
    pub definition: String,
    /// When the entry was first stored.
    pub created_at: DateTime<Utc>,
    /// When the entry was last mutated.
    pub updated_at: DateTime<Utc>,
}

/// The result of a successful lookup: canonical name and definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LexiconMatch {
    /// Canonical name of the matched entry.
    pub name: String,
    /// Definition of the matched entry.
    pub definition: String,
}

impl From<&LexiconEntry> for LexiconMatch {
    fn from(entry: &LexiconEntry) -> Self {
        Self { name: entry.name.clone(), definition: entry.definition.clone() }
    }
}

/// One `(name, definition)` row of a seed table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedEntry {
    /// Canonical name of the term.
    #[serde(alias = "Entity", alias = "entity")]
    pub name: String,
    /// Definition of the term.
    #[serde(alias = "Description", alias = "Decription", alias = "description")]
    pub definition: String,
}

impl SeedEntry {
    /// Create a seed row.
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self { name: name.into(), definition: definition.into() }
    }
}

/// Reject blank names or definitions before they reach a store.
pub(crate) fn validate(name: &str, definition: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LexiconError::InvalidEntry("name must not be empty".into()));
    }
    if definition.trim().is_empty() {
        return Err(LexiconError::InvalidEntry(format!("definition of '{name}' is empty")));
    }
    Ok(())
}
