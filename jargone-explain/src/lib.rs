//! # jargone-explain
//!
//! Retrieval-augmented jargon explanation.
//!
//! ## Overview
//!
//! An [`Explainer`] takes a sentence and:
//!
//! 1. extracts entity spans with the recognizer,
//! 2. resolves each span against the lexicon, dropping misses,
//! 3. retrieves supporting passages for the whole sentence,
//! 4. composes a prompt with [`PromptComposer`] and asks the generative model.
//!
//! Steps 2 and 3 are independent and run concurrently by default. The result
//! is an [`Explanation`]: the rewritten sentence plus the resolved
//! definitions with their original offsets.
//!
//! [`Explainer::save`] is the ingestion side: chunk, embed and index a
//! document so later explanations can cite it.
//!
//! All shared handles live in an [`AppContext`] built once at startup.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jargone_explain::{AppContext, Explainer};
//!
//! let ctx = AppContext::builder()
//!     .recognizer(recognizer)
//!     .resolver(resolver)
//!     .retriever(retriever)
//!     .generator(Arc::new(model))
//!     .build()?;
//!
//! let answer = Explainer::new(ctx).explain("The baoba produces vitamin C.").await?;
//! println!("{}", answer.explanation);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod state;

pub use config::{ExplainConfig, ExplainConfigBuilder};
pub use context::{AppContext, AppContextBuilder};
pub use error::{ExplainError, Result, Stage, StoreKind};
pub use orchestrator::{ExplainRequest, Explainer, Explanation, ResolvedTriple};
pub use prompt::{ComposedPrompt, DetailLevel, DictionaryEntry, PromptComposer};
pub use state::ExplainStage;
