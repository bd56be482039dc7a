//! Generative provider trait.

use async_trait::async_trait;

use crate::error::Result;

/// A text-generation backend.
///
/// Implementations receive a system instruction and a user message and
/// return the completion text. Wrap one in
/// [`RetryingGenerator`](crate::RetryingGenerator) to retry timeouts and
/// server errors.
///
/// # Example
///
/// ```rust,ignore
/// use jargone_model::{GenerativeProvider, MockGenerator};
///
/// let model = MockGenerator::replying("A subnet is a slice of a network.");
/// let text = model.complete("Explain simply.", "What is a subnet?", 800).await?;
/// ```
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// The model or provider name, used in logs and errors.
    fn name(&self) -> &str;

    /// Generate a completion of at most `max_tokens` tokens.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String>;
}
