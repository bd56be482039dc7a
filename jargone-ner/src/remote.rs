//! Tagger backed by a spaCy-compatible HTTP NER service.
//!
//! This module is only available when the `remote` feature is enabled.
//!
//! The service receives `{"text": "..."}` and answers with
//! `{"ents": [{"text", "label", "lemma", "start_char", "end_char"}]}`.
//! Character offsets are passed through unchanged.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{NerError, Result};
use crate::tagger::{EntityTagger, TaggedSpan};

/// Default deadline for a single tagging request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const TAGGER_NAME: &str = "remote";

/// An [`EntityTagger`] that delegates to a remote NER service.
///
/// # Example
///
/// ```rust,ignore
/// use jargone_ner::remote::RemoteTagger;
///
/// let tagger = RemoteTagger::connect("http://ner:8080/ents").await?;
/// ```
pub struct RemoteTagger {
    client: reqwest::Client,
    url: String,
}

impl RemoteTagger {
    /// Create a tagger for the given endpoint with the default timeout.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Create a tagger with an explicit per-request timeout.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(NerError::ModelLoad {
                tagger: TAGGER_NAME.into(),
                message: "service URL must not be empty".into(),
            });
        }
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            NerError::ModelLoad { tagger: TAGGER_NAME.into(), message: e.to_string() }
        })?;
        Ok(Self { client, url })
    }

    /// Create a tagger and verify the service answers a warm-up request.
    ///
    /// Used at startup so an unreachable model fails the process, not the
    /// first request.
    pub async fn connect(url: impl Into<String>) -> Result<Self> {
        let tagger = Self::new(url)?;
        tagger.request("ping").await.map_err(|e| NerError::ModelLoad {
            tagger: TAGGER_NAME.into(),
            message: e.to_string(),
        })?;
        Ok(tagger)
    }

    async fn request(&self, text: &str) -> Result<Vec<RemoteEntity>> {
        let response = self
            .client
            .post(&self.url)
            .json(&TagRequest { text })
            .send()
            .await
            .map_err(|e| {
                error!(tagger = TAGGER_NAME, error = %e, "request failed");
                if e.is_timeout() {
                    NerError::Timeout { tagger: TAGGER_NAME.into() }
                } else {
                    NerError::Tagging {
                        tagger: TAGGER_NAME.into(),
                        message: format!("request failed: {e}"),
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(tagger = TAGGER_NAME, %status, "service error");
            return Err(NerError::Tagging {
                tagger: TAGGER_NAME.into(),
                message: format!("service returned {status}: {body}"),
            });
        }

        let parsed: TagResponse = response.json().await.map_err(|e| NerError::Tagging {
            tagger: TAGGER_NAME.into(),
            message: format!("failed to parse response: {e}"),
        })?;
        Ok(parsed.ents)
    }
}

#[derive(Serialize)]
struct TagRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct TagResponse {
    #[serde(default)]
    ents: Vec<RemoteEntity>,
}

#[derive(Deserialize)]
struct RemoteEntity {
    text: String,
    label: String,
    #[serde(default)]
    lemma: Option<String>,
    start_char: usize,
    end_char: usize,
}

#[async_trait]
impl EntityTagger for RemoteTagger {
    fn name(&self) -> &str {
        TAGGER_NAME
    }

    async fn tag(&self, text: &str) -> Result<Vec<TaggedSpan>> {
        debug!(tagger = TAGGER_NAME, text_len = text.len(), "tagging text");
        let ents = self.request(text).await?;
        Ok(ents
            .into_iter()
            .map(|e| TaggedSpan {
                text: e.text,
                lemma: e.lemma,
                label: e.label,
                start: e.start_char,
                stop: e.end_char,
            })
            .collect())
    }
}
