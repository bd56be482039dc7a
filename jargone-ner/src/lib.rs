//! # jargone-ner
//!
//! Named entity recognition for the Jargone explanation pipeline.
//!
//! ## Overview
//!
//! An [`EntityTagger`] is the sequence model: it labels spans of text with
//! tagger labels (`ORG`, `PRODUCT`, `GPE`, ...). The [`EntityRecognizer`] keeps
//! only the labels listed in [`EntityCategory`] and lowercases each span's
//! lemma, producing [`SpanEntity`] values with character offsets.
//!
//! - [`HeuristicTagger`] - in-process rule-based tagger with a gazetteer
//! - `RemoteTagger` - spaCy-compatible HTTP service (feature `remote`)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jargone_ner::{EntityRecognizer, HeuristicTagger};
//!
//! let recognizer = EntityRecognizer::new(Arc::new(HeuristicTagger::new()));
//! for entity in recognizer.extract("Albert Einstein worked at Princeton University.").await? {
//!     println!("{} [{}] {}..{}", entity.text, entity.category, entity.start, entity.stop);
//! }
//! ```

pub mod entity;
pub mod error;
pub mod heuristic;
pub mod recognizer;
#[cfg(feature = "remote")]
pub mod remote;
pub mod tagger;

pub use entity::{EntityCategory, SpanEntity};
pub use error::{NerError, Result};
pub use heuristic::HeuristicTagger;
pub use recognizer::EntityRecognizer;
#[cfg(feature = "remote")]
pub use remote::RemoteTagger;
pub use tagger::{EntityTagger, TaggedSpan};
