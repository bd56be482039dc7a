//! Scripted provider for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ModelError, Result};
use crate::provider::GenerativeProvider;

/// One recorded call to [`MockGenerator::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// The system prompt received.
    pub system_prompt: String,
    /// The user prompt received.
    pub user_prompt: String,
    /// The token budget received.
    pub max_tokens: u32,
}

/// A [`GenerativeProvider`] that records calls and returns scripted output.
///
/// Queued failures are returned first, one per call. After that the fixed
/// reply is returned, or the user prompt is echoed when no reply is set.
#[derive(Debug, Default)]
pub struct MockGenerator {
    reply: Option<String>,
    failures: Mutex<VecDeque<ModelError>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGenerator {
    /// A mock that echoes the user prompt.
    pub fn echo() -> Self {
        Self::default()
    }

    /// A mock that always answers `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self { reply: Some(reply.into()), ..Self::default() }
    }

    /// Fail the next calls with these errors, in order.
    pub fn failing_with(self, failures: impl IntoIterator<Item = ModelError>) -> Self {
        if let Ok(mut queue) = self.failures.lock() {
            queue.extend(failures);
        }
        self
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or_default()
    }
}

#[async_trait]
impl GenerativeProvider for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                system_prompt: system_prompt.to_string(),
                user_prompt: user_prompt.to_string(),
                max_tokens,
            });
        }

        let failure = self.failures.lock().ok().and_then(|mut queue| queue.pop_front());
        if let Some(error) = failure {
            return Err(error);
        }

        Ok(self.reply.clone().unwrap_or_else(|| user_prompt.to_string()))
    }
}
