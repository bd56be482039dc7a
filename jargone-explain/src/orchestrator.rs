//! The explain and save entry points.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::try_join_all;
use jargone_ner::SpanEntity;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument};

use crate::config::DEFAULT_SOURCE;
use crate::context::AppContext;
use crate::error::{ExplainError, Result, Stage};
use crate::prompt::{DetailLevel, DictionaryEntry};
use crate::state::{ExplainStage, StageTracker};

/// A recognised entity joined with its lexicon definition.
///
/// `start` and `stop` are the span offsets in the request text; `entity` is
/// the canonical lexicon name, which may differ from the text when the
/// lookup tolerated a typo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTriple {
    pub entity: String,
    pub definition: String,
    pub start: usize,
    pub stop: usize,
}

/// The answer to one explain request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    /// The rewritten sentence.
    pub explanation: String,
    /// Every span that resolved, in order of appearance.
    pub definitions: Vec<ResolvedTriple>,
}

/// One explain request with optional per-request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_level: Option<DetailLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl ExplainRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), detail_level: None, role: None }
    }

    pub fn with_detail_level(mut self, level: DetailLevel) -> Self {
        self.detail_level = Some(level);
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Runs the explanation pipeline over a shared [`AppContext`].
///
/// Cheap to clone; clones share the same context.
///
/// # Example
///
/// ```rust,ignore
/// use jargone_explain::{AppContext, Explainer};
///
/// let explainer = Explainer::new(AppContext::builder() /* ... */ .build()?);
/// let answer = explainer.explain("Rotate the WPA2-PSK before the SSO cutover.").await?;
/// for d in &answer.definitions {
///     println!("{} ({}..{}): {}", d.entity, d.start, d.stop, d.definition);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Explainer {
    ctx: Arc<AppContext>,
}

impl Explainer {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    pub fn from_shared(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Explain `text` with the configured detail level and role.
    pub async fn explain(&self, text: &str) -> Result<Explanation> {
        self.explain_request(ExplainRequest::new(text)).await
    }

    /// Explain one request.
    ///
    /// Entities without a lexicon entry are dropped and an empty retrieval is
    /// fine; both still produce an explanation. Blank input is returned
    /// unchanged without calling any model.
    ///
    /// # Errors
    ///
    /// Recognition, store, retrieval and generation failures are returned as
    /// the matching [`ExplainError`] kind.
    #[instrument(skip_all, fields(chars = request.text.chars().count()))]
    pub async fn explain_request(&self, request: ExplainRequest) -> Result<Explanation> {
        let mut tracker = StageTracker::new();
        let result = self.run(&request, &mut tracker).await;
        if let Err(e) = &result {
            error!(stage = %tracker.stage(), error = %e, "explain failed");
            tracker.advance(ExplainStage::Failed);
        }
        result
    }

    async fn run(&self, request: &ExplainRequest, tracker: &mut StageTracker) -> Result<Explanation> {
        let text = request.text.as_str();
        if text.trim().is_empty() {
            tracker.advance(ExplainStage::Completed);
            return Ok(Explanation { explanation: text.to_string(), definitions: Vec::new() });
        }

        let spans = self
            .ctx
            .recognizer
            .extract(text)
            .await
            .map_err(|e| ExplainError::from_ner(Stage::Recognition, e))?;
        tracker.advance(ExplainStage::EntitiesExtracted);
        debug!(entity_count = spans.len(), "entities extracted");

        let (definitions, passages) = if self.ctx.config.concurrent_retrieval {
            let joined = tokio::try_join!(self.resolve(&spans), self.retrieve(text))?;
            tracker.advance(ExplainStage::EntitiesResolved);
            tracker.advance(ExplainStage::ContextRetrieved);
            joined
        } else {
            let definitions = self.resolve(&spans).await?;
            tracker.advance(ExplainStage::EntitiesResolved);
            let passages = self.retrieve(text).await?;
            tracker.advance(ExplainStage::ContextRetrieved);
            (definitions, passages)
        };

        let detail_level = request.detail_level.unwrap_or(self.ctx.config.default_detail_level);
        let role = request.role.as_deref().unwrap_or(&self.ctx.config.default_role);
        let prompt = self.ctx.composer.compose(
            text,
            &passages,
            &dictionary(&definitions),
            detail_level,
            role,
        )?;

        let explanation = self
            .ctx
            .generator
            .complete(&prompt.system, &prompt.user, self.ctx.config.max_tokens)
            .await
            .map_err(|e| ExplainError::from_model(Stage::Generation, e))?;
        tracker.advance(ExplainStage::Completed);

        info!(
            definition_count = definitions.len(),
            passage_count = passages.len(),
            model = self.ctx.generator.name(),
            "explanation completed"
        );
        Ok(Explanation { explanation, definitions })
    }

    /// Look up every span; misses are dropped, order is kept.
    async fn resolve(&self, spans: &[SpanEntity]) -> Result<Vec<ResolvedTriple>> {
        let resolver = &self.ctx.resolver;
        let lookups = spans.iter().map(|span| async move {
            let hit = resolver
                .lookup(&span.text)
                .await
                .map_err(|e| ExplainError::from_lexicon(Stage::Resolution, e))?;
            Ok::<_, ExplainError>(hit.map(|m| ResolvedTriple {
                entity: m.name,
                definition: m.definition,
                start: span.start,
                stop: span.stop,
            }))
        });

        let triples: Vec<ResolvedTriple> = try_join_all(lookups).await?.into_iter().flatten().collect();
        debug!(span_count = spans.len(), resolved = triples.len(), "entities resolved");
        Ok(triples)
    }

    async fn retrieve(&self, text: &str) -> Result<Vec<String>> {
        let results = self
            .ctx
            .retriever
            .retrieve(text)
            .await
            .map_err(|e| ExplainError::from_provider_vectors(Stage::Retrieval, e))?;
        debug!(passage_count = results.len(), "context retrieved");
        Ok(results.into_iter().map(|r| r.text).collect())
    }

    /// Chunk, embed and index a document.
    ///
    /// A blank `source` is stored as `file_upload`. Caller metadata is merged
    /// into every chunk's metadata. Returns whether anything was stored.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::InvalidInput`] for blank content before any
    /// embedding call is made.
    #[instrument(skip_all, fields(source = source))]
    pub async fn save(
        &self,
        content: &str,
        source: &str,
        metadata: Option<Map<String, Value>>,
    ) -> Result<bool> {
        if content.trim().is_empty() {
            return Err(ExplainError::InvalidInput("document content must not be empty".into()));
        }
        let source = match source.trim() {
            "" => DEFAULT_SOURCE,
            trimmed => trimmed,
        };

        let mut chunks = self
            .ctx
            .indexer
            .chunkize(content, source)
            .await
            .map_err(|e| ExplainError::from_rag(Stage::Indexing, e))?;

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = self
            .ctx
            .retriever
            .embed_batch(&texts)
            .await
            .map_err(|e| ExplainError::from_rag(Stage::Indexing, e))?;

        for (chunk, vector) in chunks.iter_mut().zip(vectors) {
            chunk.embedding = Some(vector);
            if let Some(metadata) = &metadata {
                chunk.metadata.extend(metadata.clone());
            }
        }

        let ids = self
            .ctx
            .retriever
            .add(&chunks)
            .await
            .inspect_err(|e| error!(source, error = %e, "failed to store document"))
            .map_err(|e| ExplainError::from_provider_vectors(Stage::Indexing, e))?;

        info!(source, chunk_count = ids.len(), "document saved");
        Ok(!ids.is_empty())
    }
}

/// Dictionary for the prompt: one entry per canonical name.
fn dictionary(definitions: &[ResolvedTriple]) -> Vec<DictionaryEntry> {
    let mut seen = HashSet::new();
    definitions
        .iter()
        .filter(|d| seen.insert(d.entity.to_lowercase()))
        .map(|d| DictionaryEntry::new(&d.entity, &d.definition))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(entity: &str, start: usize) -> ResolvedTriple {
        ResolvedTriple { entity: entity.into(), definition: format!("{entity} def"), start, stop: start + 3 }
    }

    #[test]
    fn dictionary_deduplicates_by_name() {
        let entries = dictionary(&[triple("sso", 0), triple("vpn", 10), triple("SSO", 20)]);
        assert_eq!(
            entries,
            vec![DictionaryEntry::new("sso", "sso def"), DictionaryEntry::new("vpn", "vpn def")]
        );
    }

    #[test]
    fn request_deserializes_with_optional_fields() {
        let request: ExplainRequest =
            serde_json::from_str(r#"{"text": "hi", "detail_level": "low"}"#).unwrap();
        assert_eq!(request.detail_level, Some(DetailLevel::Low));
        assert_eq!(request.role, None);
    }

    #[test]
    fn explanation_serializes_in_the_response_shape() {
        let explanation = Explanation { explanation: "x".into(), definitions: vec![triple("jwt", 4)] };
        let json = serde_json::to_value(&explanation).unwrap();
        assert_eq!(json["definitions"][0]["entity"], "jwt");
        assert_eq!(json["definitions"][0]["start"], 4);
        assert_eq!(json["definitions"][0]["stop"], 7);
    }
}
