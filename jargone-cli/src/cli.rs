//! Command-line arguments.
//!
//! Every setting can also come from the environment (or a `.env` file loaded
//! before parsing).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jargone_explain::DetailLevel;
use jargone_model::openai::DEFAULT_CHAT_MODEL;
use jargone_rag::chunking::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

#[derive(Debug, Parser)]
#[command(name = "jargone", version)]
#[command(about = "Explain technical jargon with retrieval-augmented generation")]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

/// Backend and model settings shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// API key for the chat and embedding endpoints
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible base URL
    #[arg(long, env = "OPENAI_BASE_URL", global = true)]
    pub openai_base_url: Option<String>,

    /// Chat model used for explanations
    #[arg(long, env = "JARGONE_CHAT_MODEL", default_value = DEFAULT_CHAT_MODEL, global = true)]
    pub chat_model: String,

    /// PostgreSQL URL for the lexicon; in-memory when unset
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    pub database_url: Option<String>,

    /// Qdrant gRPC URL for the vector index; in-memory when unset
    #[arg(long, env = "QDRANT_URL", global = true)]
    pub qdrant_url: Option<String>,

    /// Vector index collection
    #[arg(long, env = "COLLECTION_NAME", default_value = "documents", global = true)]
    pub collection: String,

    /// Embedding dimension of the collection
    #[arg(long, env = "EMBEDDING_DIMENSION", default_value_t = 1536, global = true)]
    pub embedding_dimension: usize,

    /// Chunk window in characters
    #[arg(long, env = "CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE, global = true)]
    pub chunk_size: usize,

    /// Overlap between chunk windows in characters
    #[arg(long, env = "CHUNK_OVERLAP", default_value_t = DEFAULT_CHUNK_OVERLAP, global = true)]
    pub chunk_overlap: usize,

    /// Passages retrieved per explanation
    #[arg(long, env = "TOP_K", default_value_t = 5, global = true)]
    pub top_k: usize,

    /// spaCy-compatible NER endpoint; the built-in heuristic tagger when unset
    #[arg(long, env = "NER_URL", global = true)]
    pub ner_url: Option<String>,

    /// Timeout for every remote call, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub request_timeout_secs: u64,

    /// Log output: pretty or json
    #[arg(long, env = "JARGONE_LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: String,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Explain a sentence and print the result as JSON
    Explain {
        /// The text to explain
        text: String,

        /// high or low
        #[arg(long, default_value = "high")]
        detail: DetailLevel,

        /// Who the explanation is for
        #[arg(long)]
        role: Option<String>,
    },

    /// Index a text file so later explanations can use it
    Save {
        /// File to read
        file: PathBuf,

        /// Source name stored with every chunk
        #[arg(long)]
        source: Option<String>,

        /// Extra metadata as key=value, repeatable
        #[arg(long = "meta", value_parser = parse_key_val)]
        meta: Vec<(String, String)>,
    },

    /// Create the lexicon schema and load the seed table if empty
    Seed {
        /// CSV with name/definition columns; the built-in table when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Parse `key=value`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) =
        s.split_once('=').ok_or_else(|| format!("invalid key=value: no '=' in '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid key=value: empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_explain_with_options() {
        let cli = Cli::try_parse_from([
            "jargone",
            "explain",
            "Rotate the WPA2-PSK.",
            "--detail",
            "low",
            "--role",
            "accountant",
        ])
        .unwrap();
        match cli.command {
            Command::Explain { text, detail, role } => {
                assert_eq!(text, "Rotate the WPA2-PSK.");
                assert_eq!(detail, DetailLevel::Low);
                assert_eq!(role.as_deref(), Some("accountant"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_save_metadata_pairs() {
        let cli = Cli::try_parse_from([
            "jargone", "save", "notes.md", "--meta", "team=ops", "--meta", "lang=en",
        ])
        .unwrap();
        match cli.command {
            Command::Save { file, source, meta } => {
                assert_eq!(file, PathBuf::from("notes.md"));
                assert_eq!(source, None);
                assert_eq!(
                    meta,
                    vec![("team".into(), "ops".into()), ("lang".into(), "en".into())]
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_detail_level() {
        assert!(Cli::try_parse_from(["jargone", "explain", "x", "--detail", "medium"]).is_err());
    }

    #[test]
    fn key_val_requires_a_key_and_an_equals_sign() {
        assert_eq!(parse_key_val("a=b=c").unwrap(), ("a".into(), "b=c".into()));
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }
}
