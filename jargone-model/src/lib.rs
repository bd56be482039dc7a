//! # jargone-model
//!
//! Generative model providers for Jargone.
//!
//! ## Overview
//!
//! - [`GenerativeProvider`] - the completion seam: system prompt, user prompt, token budget
//! - `OpenAIChatProvider` (feature `openai`) - OpenAI or any compatible chat completions API
//! - [`MockGenerator`] - scripted replies and recorded calls for tests
//! - [`RetryingGenerator`] - exponential backoff for timeouts, rate limits and 5xx answers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jargone_model::openai::{OpenAIChatProvider, OpenAIConfig};
//! use jargone_model::{GenerativeProvider, RetryPolicy, RetryingGenerator};
//!
//! let openai = OpenAIChatProvider::new(OpenAIConfig::new(api_key, "gpt-4o-mini"))?;
//! let model = RetryingGenerator::new(openai, RetryPolicy::default());
//! let text = model.complete(system, user, 800).await?;
//! ```

pub mod error;
pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;
pub mod provider;
pub mod retry;

pub use error::{ModelError, Result};
pub use mock::{MockGenerator, RecordedCall};
#[cfg(feature = "openai")]
pub use openai::{OpenAIChatProvider, OpenAIConfig};
pub use provider::GenerativeProvider;
pub use retry::{RetryPolicy, RetryPolicyBuilder, RetryingGenerator};
