//! Wires backends from [`Settings`] and runs subcommands.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use jargone_explain::{AppContext, ExplainRequest, Explainer};
use jargone_lexicon::{
    InMemoryLexicon, LexiconResolver, LexiconStore, PgLexiconStore, SeedEntry, seed,
};
use jargone_model::{OpenAIChatProvider, OpenAIConfig, RetryPolicy, RetryingGenerator};
use jargone_ner::{EntityRecognizer, EntityTagger, HeuristicTagger, RemoteTagger};
use jargone_rag::{
    EmbeddingProvider, InMemoryVectorIndex, OpenAIEmbeddingProvider, QdrantVectorIndex,
    RetrievalConfig, Retriever, VectorIndex,
};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::cli::{Cli, Command, Settings};

/// Run one parsed command line and print its JSON result.
pub async fn run(cli: Cli) -> Result<()> {
    let output = execute(cli).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Run one parsed command line and return its JSON result.
///
/// `save` and `seed` report the backend they wrote to and whether it outlives
/// the process.
pub async fn execute(cli: Cli) -> Result<Value> {
    let settings = cli.settings;
    match cli.command {
        Command::Explain { text, detail, role } => {
            let explainer = Explainer::new(build_context(&settings).await?);
            let mut request = ExplainRequest::new(text).with_detail_level(detail);
            if let Some(role) = role {
                request = request.with_role(role);
            }
            let explanation = explainer.explain_request(request).await?;
            Ok(serde_json::to_value(&explanation)?)
        }
        Command::Save { file, source, meta } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let metadata: Map<String, Value> =
                meta.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
            let metadata = (!metadata.is_empty()).then_some(metadata);

            let ctx = build_context(&settings).await?;
            let backend = ctx.retriever().vector_index().backend().to_string();
            let explainer = Explainer::new(ctx);
            let success =
                explainer.save(&content, source.as_deref().unwrap_or_default(), metadata).await?;
            Ok(write_report(
                json!({ "success": success }),
                &backend,
                settings.qdrant_url.is_some(),
            ))
        }
        Command::Seed { file } => {
            let rows: Vec<SeedEntry> = match &file {
                Some(path) => seed::load_seed_csv(path)?,
                None => seed::default_seed(),
            };
            let resolver = build_resolver(&settings).await?;
            let inserted = resolver.bootstrap(&rows).await?;
            Ok(write_report(
                json!({ "inserted": inserted }),
                resolver.store().backend(),
                settings.database_url.is_some(),
            ))
        }
    }
}

/// Attach the backend to a write result, warning when it is in memory.
fn write_report(mut report: Value, backend: &str, persistent: bool) -> Value {
    if !persistent {
        warn!(backend, "no persistent backend configured, written data is lost on exit");
    }
    report["backend"] = Value::String(backend.to_string());
    report["persistent"] = Value::Bool(persistent);
    report
}

/// Build the shared context for `explain` and `save`.
///
/// The lexicon is bootstrapped with the built-in table, which is a no-op for
/// a store that already holds entries.
pub async fn build_context(settings: &Settings) -> Result<AppContext> {
    let timeout = Duration::from_secs(settings.request_timeout_secs);
    let api_key = settings
        .openai_api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .context("OPENAI_API_KEY must be set for explain and save")?;

    let resolver = build_resolver(settings).await?;
    resolver.bootstrap(&seed::default_seed()).await?;

    let recognizer = Arc::new(EntityRecognizer::new(build_tagger(settings, &resolver).await?));

    let mut embedder = OpenAIEmbeddingProvider::new(api_key.clone())?.with_timeout(timeout);
    if let Some(base_url) = &settings.openai_base_url {
        embedder = embedder.with_base_url(base_url);
    }
    if embedder.dimensions() != settings.embedding_dimension {
        embedder = embedder.with_dimensions(settings.embedding_dimension);
    }

    let retriever = Retriever::builder()
        .config(
            RetrievalConfig::builder()
                .collection(&settings.collection)
                .dimensions(settings.embedding_dimension)
                .top_k(settings.top_k)
                .chunk_size(settings.chunk_size)
                .chunk_overlap(settings.chunk_overlap)
                .build()?,
        )
        .embedding_provider(Arc::new(embedder))
        .vector_index(build_index(settings, timeout)?)
        .build()?;

    let mut chat = OpenAIConfig::new(api_key, &settings.chat_model).with_timeout(timeout);
    if let Some(base_url) = &settings.openai_base_url {
        chat = chat.with_base_url(base_url);
    }
    let generator = RetryingGenerator::new(OpenAIChatProvider::new(chat)?, RetryPolicy::default());

    let ctx = AppContext::builder()
        .recognizer(recognizer)
        .resolver(Arc::new(resolver))
        .retriever(Arc::new(retriever))
        .generator(Arc::new(generator))
        .build()?;
    info!(context = ?ctx, "application context ready");
    Ok(ctx)
}

/// The remote tagger when `NER_URL` is set, else the rule tagger with every
/// lexicon name in its gazetteer.
async fn build_tagger(
    settings: &Settings,
    resolver: &LexiconResolver,
) -> Result<Arc<dyn EntityTagger>> {
    match &settings.ner_url {
        Some(url) => {
            let tagger = RemoteTagger::connect(url.as_str())
                .await
                .with_context(|| format!("NER service at {url} is unavailable"))?;
            Ok(Arc::new(tagger))
        }
        None => {
            let names = resolver.names().await.context("failed to list lexicon names")?;
            info!(terms = names.len(), "heuristic tagger gazetteer loaded from the lexicon");
            let terms = names.into_iter().map(|name| (name, "PRODUCT"));
            Ok(Arc::new(HeuristicTagger::new().with_terms(terms)))
        }
    }
}

async fn build_resolver(settings: &Settings) -> Result<LexiconResolver> {
    let store: Arc<dyn LexiconStore> = match &settings.database_url {
        Some(url) => Arc::new(
            PgLexiconStore::new(url).await.context("failed to connect to the lexicon database")?,
        ),
        None => Arc::new(InMemoryLexicon::new()),
    };
    Ok(LexiconResolver::new(store))
}

fn build_index(settings: &Settings, timeout: Duration) -> Result<Arc<dyn VectorIndex>> {
    match &settings.qdrant_url {
        Some(url) if url.trim().is_empty() => bail!("QDRANT_URL is set but empty"),
        Some(url) => Ok(Arc::new(QdrantVectorIndex::with_timeout(url, timeout)?)),
        None => Ok(Arc::new(InMemoryVectorIndex::new())),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn settings(args: &[&str]) -> Settings {
        let mut argv = vec!["jargone"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["seed"]);
        Cli::try_parse_from(argv).unwrap().settings
    }

    #[tokio::test]
    async fn explain_requires_an_api_key() {
        let mut settings = settings(&[]);
        settings.openai_api_key = Some("   ".into());
        let err = build_context(&settings).await.unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn in_memory_backends_when_urls_are_unset() {
        let mut settings = settings(&[]);
        settings.database_url = None;
        settings.qdrant_url = None;

        let resolver = build_resolver(&settings).await.unwrap();
        assert_eq!(resolver.store().backend(), "InMemory");
        let index = build_index(&settings, Duration::from_secs(1)).unwrap();
        assert_eq!(index.backend(), "InMemory");
    }

    #[tokio::test]
    async fn heuristic_tagger_knows_every_lexicon_name() {
        let mut settings = settings(&[]);
        settings.ner_url = None;
        settings.database_url = None;
        let resolver = build_resolver(&settings).await.unwrap();
        resolver.bootstrap(&seed::default_seed()).await.unwrap();
        resolver.define("Zanzibar", "a globally consistent authorization system").await.unwrap();

        let recognizer = EntityRecognizer::new(build_tagger(&settings, &resolver).await.unwrap());
        let texts =
            recognizer.extract_texts("our kubernetes cluster checks zanzibar").await.unwrap();
        assert!(texts.contains(&"kubernetes".to_string()));
        assert!(texts.contains(&"zanzibar".to_string()));
    }

    #[tokio::test]
    async fn seed_without_a_database_reports_an_in_memory_write() {
        let mut cli = Cli::try_parse_from(["jargone", "seed"]).unwrap();
        cli.settings.database_url = None;

        let output = execute(cli).await.unwrap();

        assert_eq!(output["inserted"], seed::default_seed().len());
        assert_eq!(output["backend"], "InMemory");
        assert_eq!(output["persistent"], false);
    }

    #[test]
    fn write_report_marks_persistent_backends() {
        let report = write_report(json!({ "success": true }), "qdrant", true);
        assert_eq!(report, json!({ "success": true, "backend": "qdrant", "persistent": true }));
    }
}
