//! # jargone-cli
//!
//! The `jargone` binary: explain a sentence, index a document or seed the
//! lexicon from the command line.
//!
//! Backends are chosen from the environment. `DATABASE_URL` selects the
//! PostgreSQL lexicon and `QDRANT_URL` selects Qdrant; either falls back to
//! an in-memory store when unset, in which case `save` and `seed` warn and
//! report `"persistent": false`. `NER_URL` selects a remote tagger over the
//! built-in heuristic one, whose gazetteer holds every lexicon name.
//!
//! ```text
//! jargone seed --file dictionary.csv
//! jargone save handbook.md --source it-handbook --meta team=it
//! jargone explain "Rotate the WPA2-PSK before the SSO cutover." --detail low --role accountant
//! ```

pub mod app;
pub mod cli;

pub use app::{build_context, execute, run};
pub use cli::{Cli, Command, Settings};
