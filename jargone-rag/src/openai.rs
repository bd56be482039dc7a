//! OpenAI embedding provider using the OpenAI embeddings API.
//!
//! This module is only available when the `openai` feature is enabled. Any
//! OpenAI-compatible server works through [`OpenAIEmbeddingProvider::with_base_url`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

const PROVIDER: &str = "OpenAI";

/// The default OpenAI API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Upper bound on a single embeddings request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The default model for OpenAI embeddings.
const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

/// An [`EmbeddingProvider`] backed by the `/embeddings` endpoint of OpenAI or
/// a compatible server.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-3-small`.
/// - `dimensions` – optional Matryoshka dimension override.
/// - `api_key` – from the constructor or the `OPENAI_API_KEY` environment variable.
/// - `base_url` – defaults to `https://api.openai.com/v1`.
/// - `timeout` – defaults to 30 seconds; expiry maps to [`RagError::Timeout`].
///
/// Every returned vector is checked against [`dimensions`](EmbeddingProvider::dimensions),
/// so a misconfigured server surfaces as an embedding error rather than a
/// bad chunk.
///
/// # Example
///
/// ```rust,ignore
/// use jargone_rag::openai::OpenAIEmbeddingProvider;
///
/// let provider = OpenAIEmbeddingProvider::new("sk-...")?
///     .with_base_url("http://localhost:8080/v1")
///     .with_timeout(Duration::from_secs(10));
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OpenAIEmbeddingProvider {
    http: reqwest::Client,
    endpoint: Endpoint,
    model: String,
    dimensions: usize,
    /// If set, passed to the API for Matryoshka dimension truncation.
    request_dimensions: Option<usize>,
}

/// Where and how long to talk to the embeddings API.
#[derive(Debug, Clone)]
struct Endpoint {
    url: String,
    api_key: String,
    timeout: Duration,
}

impl Endpoint {
    fn new(base_url: &str, api_key: String, timeout: Duration) -> Self {
        Self { url: format!("{}/embeddings", base_url.trim_end_matches('/')), api_key, timeout }
    }

    async fn post(
        &self,
        http: &reqwest::Client,
        body: &EmbeddingRequest<'_>,
    ) -> Result<EmbeddingResponse> {
        let response = http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!(provider = PROVIDER, url = %self.url, %status, "API error");
            return Err(embedding_error(format!("API returned {status}: {detail}")));
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                return self.transport_error(e);
            }
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            embedding_error(format!("failed to parse response: {e}"))
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> RagError {
        error!(provider = PROVIDER, url = %self.url, error = %e, "request failed");
        if e.is_timeout() {
            RagError::Timeout {
                component: PROVIDER.into(),
                message: format!("no response from {} within {:?}", self.url, self.timeout),
            }
        } else {
            embedding_error(format!("request to {} failed: {e}", self.url))
        }
    }
}

fn embedding_error(message: impl Into<String>) -> RagError {
    RagError::EmbeddingError { provider: PROVIDER.into(), message: message.into() }
}

impl OpenAIEmbeddingProvider {
    /// Create a new provider with the given API key.
    ///
    /// Uses the default model (`text-embedding-3-small`) and dimensions (1536).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(embedding_error("API key must not be empty"));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: Endpoint::new(DEFAULT_BASE_URL, api_key, DEFAULT_TIMEOUT),
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
            request_dimensions: None,
        })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| embedding_error("OPENAI_API_KEY environment variable not set"))?;
        Self::new(api_key)
    }

    /// Point the provider at an OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        let Endpoint { api_key, timeout, .. } = self.endpoint;
        self.endpoint = Endpoint::new(base_url.as_ref(), api_key, timeout);
        self
    }

    /// Bound every request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.endpoint.timeout = timeout;
        self
    }

    /// Set the model name (e.g. `text-embedding-3-large`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the output dimensions (Matryoshka support).
    ///
    /// When set, the API returns embeddings truncated to this size.
    /// This also updates the value returned by [`dimensions()`](EmbeddingProvider::dimensions).
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = Some(dims);
        self
    }

    /// The full embeddings URL requests are sent to.
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint.url
    }

    fn request<'a>(&'a self, texts: &[&'a str]) -> EmbeddingRequest<'a> {
        EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
            dimensions: self.request_dimensions,
        }
    }

    /// Put vectors back in input order and check their count and length.
    fn collect(&self, expected: usize, response: EmbeddingResponse) -> Result<Vec<Vec<f32>>> {
        let mut data = response.data;
        if data.len() != expected {
            return Err(embedding_error(format!(
                "expected {expected} embeddings, got {}",
                data.len()
            )));
        }
        data.sort_by_key(|d| d.index);

        data.into_iter()
            .map(|d| {
                if d.embedding.len() == self.dimensions {
                    Ok(d.embedding)
                } else {
                    Err(embedding_error(format!(
                        "model {} returned {} dimensions for input {}, expected {}",
                        self.model,
                        d.embedding.len(),
                        d.index,
                        self.dimensions
                    )))
                }
            })
            .collect()
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| embedding_error("API returned empty response"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = PROVIDER,
            batch_size = texts.len(),
            model = %self.model,
            url = %self.endpoint.url,
            "embedding batch"
        );

        let response = self.endpoint.post(&self.http, &self.request(texts)).await?;
        self.collect(texts.len(), response)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
