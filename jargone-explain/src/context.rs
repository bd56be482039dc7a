//! Process-wide handles shared by every request.

use std::sync::Arc;

use jargone_lexicon::LexiconResolver;
use jargone_model::GenerativeProvider;
use jargone_ner::EntityRecognizer;
use jargone_rag::{ChunkIndexer, Retriever};

use crate::config::ExplainConfig;
use crate::error::{ExplainError, Result};
use crate::prompt::PromptComposer;

/// Everything the pipeline needs, built once at startup.
///
/// All handles are read-mostly and shared across concurrent requests.
/// Construct one via [`AppContext::builder()`].
#[derive(Clone)]
pub struct AppContext {
    pub(crate) recognizer: Arc<EntityRecognizer>,
    pub(crate) resolver: Arc<LexiconResolver>,
    pub(crate) retriever: Arc<Retriever>,
    pub(crate) indexer: Arc<ChunkIndexer>,
    pub(crate) generator: Arc<dyn GenerativeProvider>,
    pub(crate) composer: Arc<PromptComposer>,
    pub(crate) config: ExplainConfig,
}

impl AppContext {
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::default()
    }

    pub fn recognizer(&self) -> &Arc<EntityRecognizer> {
        &self.recognizer
    }

    pub fn resolver(&self) -> &Arc<LexiconResolver> {
        &self.resolver
    }

    pub fn retriever(&self) -> &Arc<Retriever> {
        &self.retriever
    }

    pub fn indexer(&self) -> &Arc<ChunkIndexer> {
        &self.indexer
    }

    pub fn generator(&self) -> &Arc<dyn GenerativeProvider> {
        &self.generator
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    pub fn config(&self) -> &ExplainConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("recognizer", &self.recognizer)
            .field("resolver", &self.resolver)
            .field("retriever", &self.retriever)
            .field("generator", &self.generator.name())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for [`AppContext`].
#[derive(Default)]
pub struct AppContextBuilder {
    recognizer: Option<Arc<EntityRecognizer>>,
    resolver: Option<Arc<LexiconResolver>>,
    retriever: Option<Arc<Retriever>>,
    indexer: Option<Arc<ChunkIndexer>>,
    generator: Option<Arc<dyn GenerativeProvider>>,
    composer: Option<PromptComposer>,
    config: Option<ExplainConfig>,
}

impl AppContextBuilder {
    pub fn recognizer(mut self, recognizer: Arc<EntityRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn resolver(mut self, resolver: Arc<LexiconResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn retriever(mut self, retriever: Arc<Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Set the chunk indexer used by `save`.
    ///
    /// Defaults to one using the retriever's chunk size and overlap.
    pub fn indexer(mut self, indexer: Arc<ChunkIndexer>) -> Self {
        self.indexer = Some(indexer);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn GenerativeProvider>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Defaults to [`PromptComposer::default`].
    pub fn composer(mut self, composer: PromptComposer) -> Self {
        self.composer = Some(composer);
        self
    }

    /// Defaults to [`ExplainConfig::default`].
    pub fn config(mut self, config: ExplainConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the [`AppContext`].
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::Config`] if a required handle is missing or the
    /// default chunk indexer cannot be built from the retriever's settings.
    pub fn build(self) -> Result<AppContext> {
        let recognizer = self
            .recognizer
            .ok_or_else(|| ExplainError::Config("recognizer is required".to_string()))?;
        let resolver =
            self.resolver.ok_or_else(|| ExplainError::Config("resolver is required".to_string()))?;
        let retriever = self
            .retriever
            .ok_or_else(|| ExplainError::Config("retriever is required".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| ExplainError::Config("generator is required".to_string()))?;

        let indexer = match self.indexer {
            Some(indexer) => indexer,
            None => {
                let config = retriever.config();
                let indexer =
                    ChunkIndexer::new(config.chunk_size, config.chunk_overlap, recognizer.clone())
                        .map_err(|e| ExplainError::Config(e.to_string()))?;
                Arc::new(indexer)
            }
        };

        Ok(AppContext {
            recognizer,
            resolver,
            retriever,
            indexer,
            generator,
            composer: Arc::new(self.composer.unwrap_or_default()),
            config: self.config.unwrap_or_default(),
        })
    }
}
