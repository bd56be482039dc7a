//! Tagger trait for sequence models that label spans of text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A raw span produced by a tagger, before category filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSpan {
    /// Surface text of the span.
    pub text: String,
    /// Lemma of the span, when the tagger produces one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    /// Tagger label (`ORG`, `PRODUCT`, `GPE`, ...).
    pub label: String,
    /// Character offset where the span begins.
    pub start: usize,
    /// Character offset one past the end of the span.
    pub stop: usize,
}

/// A model that tags entity spans in free text.
///
/// Implementations wrap a concrete sequence model (an in-process rule set,
/// a remote spaCy service, ...) behind a unified async interface. A tagger
/// is loaded once at startup and shared by every request.
///
/// # Example
///
/// ```rust,ignore
/// use jargone_ner::{EntityTagger, HeuristicTagger};
///
/// let tagger = HeuristicTagger::new();
/// let spans = tagger.tag("Apple released the iPhone 15.").await?;
/// ```
#[async_trait]
pub trait EntityTagger: Send + Sync {
    /// A short name for logs and errors.
    fn name(&self) -> &str;

    /// Tag every entity span in `text`.
    async fn tag(&self, text: &str) -> Result<Vec<TaggedSpan>>;
}
