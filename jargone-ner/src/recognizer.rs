//! The entity recognizer: tagger output filtered to the allow-listed categories.

use std::sync::Arc;

use tracing::{debug, error};

use crate::entity::{EntityCategory, SpanEntity};
use crate::error::Result;
use crate::tagger::EntityTagger;

/// Extracts allow-listed entity spans from free text.
///
/// Wraps a shared [`EntityTagger`]. Spans whose label is not one of the
/// [`EntityCategory`] variants are dropped. Returned span texts are the
/// lowercased lemma of the tagged span.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use jargone_ner::{EntityRecognizer, HeuristicTagger};
///
/// let recognizer = EntityRecognizer::new(Arc::new(HeuristicTagger::new()));
/// let entities = recognizer.extract("Dr. Rivera joined OpenAI.").await?;
/// ```
#[derive(Clone)]
pub struct EntityRecognizer {
    tagger: Arc<dyn EntityTagger>,
}

impl EntityRecognizer {
    /// Create a recognizer backed by the given tagger.
    pub fn new(tagger: Arc<dyn EntityTagger>) -> Self {
        Self { tagger }
    }

    /// Return a reference to the underlying tagger.
    pub fn tagger(&self) -> &Arc<dyn EntityTagger> {
        &self.tagger
    }

    /// Extract allow-listed entity spans from `text`.
    ///
    /// Empty input yields an empty sequence without calling the tagger.
    ///
    /// # Errors
    ///
    /// Propagates the tagger's error when tagging fails.
    pub async fn extract(&self, text: &str) -> Result<Vec<SpanEntity>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let tagged = self.tagger.tag(text).await.map_err(|e| {
            error!(tagger = self.tagger.name(), error = %e, "entity tagging failed");
            e
        })?;

        let entities: Vec<SpanEntity> = tagged
            .into_iter()
            .filter_map(|span| {
                debug!(text = %span.text, label = %span.label, "tagged span");
                let category = EntityCategory::from_label(&span.label)?;
                let lemma = span.lemma.as_deref().unwrap_or(&span.text);
                Some(SpanEntity {
                    text: lemma.to_lowercase(),
                    category,
                    start: span.start,
                    stop: span.stop,
                })
            })
            .collect();

        debug!(entity_count = entities.len(), "extracted entities");
        Ok(entities)
    }

    /// Extract only the span texts, in order of appearance.
    pub async fn extract_texts(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.extract(text).await?.into_iter().map(|e| e.text).collect())
    }
}

impl std::fmt::Debug for EntityRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRecognizer").field("tagger", &self.tagger.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::NerError;
    use crate::tagger::TaggedSpan;

    struct ScriptedTagger {
        spans: Vec<TaggedSpan>,
        calls: AtomicUsize,
    }

    impl ScriptedTagger {
        fn new(spans: Vec<TaggedSpan>) -> Self {
            Self { spans, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl EntityTagger for ScriptedTagger {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn tag(&self, _text: &str) -> Result<Vec<TaggedSpan>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.spans.clone())
        }
    }

    struct FailingTagger;

    #[async_trait]
    impl EntityTagger for FailingTagger {
        fn name(&self) -> &str {
            "failing"
        }

        async fn tag(&self, _text: &str) -> Result<Vec<TaggedSpan>> {
            Err(NerError::Tagging { tagger: "failing".into(), message: "boom".into() })
        }
    }

    fn span(text: &str, lemma: Option<&str>, label: &str, start: usize, stop: usize) -> TaggedSpan {
        TaggedSpan {
            text: text.into(),
            lemma: lemma.map(Into::into),
            label: label.into(),
            start,
            stop,
        }
    }

    #[tokio::test]
    async fn keeps_only_allow_listed_categories() {
        let tagger = Arc::new(ScriptedTagger::new(vec![
            span("Zoom", None, "ORG", 0, 4),
            span("Paris", None, "GPE", 10, 15),
            span("Monday", None, "DATE", 20, 26),
            span("Einstein", None, "PERSON", 30, 38),
        ]));
        let recognizer = EntityRecognizer::new(tagger);

        let entities = recognizer.extract("irrelevant").await.unwrap();
        assert_eq!(
            entities,
            vec![
                SpanEntity {
                    text: "zoom".into(),
                    category: EntityCategory::Organization,
                    start: 0,
                    stop: 4
                },
                SpanEntity {
                    text: "einstein".into(),
                    category: EntityCategory::Person,
                    start: 30,
                    stop: 38
                },
            ]
        );
    }

    #[tokio::test]
    async fn uses_lowercased_lemma() {
        let tagger =
            Arc::new(ScriptedTagger::new(vec![span("Baobabs", Some("Baobab"), "PRODUCT", 4, 11)]));
        let recognizer = EntityRecognizer::new(tagger);

        let texts = recognizer.extract_texts("The Baobabs").await.unwrap();
        assert_eq!(texts, vec!["baobab".to_string()]);
    }

    #[tokio::test]
    async fn empty_input_skips_the_tagger() {
        let tagger = Arc::new(ScriptedTagger::new(vec![span("x", None, "ORG", 0, 1)]));
        let recognizer = EntityRecognizer::new(tagger.clone());

        let entities = recognizer.extract("").await.unwrap();
        assert!(entities.is_empty());
        assert_eq!(tagger.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tagging_failures_are_surfaced() {
        let recognizer = EntityRecognizer::new(Arc::new(FailingTagger));
        let err = recognizer.extract("some text").await.unwrap_err();
        assert!(matches!(err, NerError::Tagging { .. }));
    }
}
