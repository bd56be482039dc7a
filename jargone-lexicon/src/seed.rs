//! Seed tables for a fresh lexicon.
//!
//! [`default_seed`] returns a small built-in table of common technical jargon.
//! [`load_seed_csv`] reads a dictionary CSV with an `Entity` (or `name`) column
//! and a `Description` (or `definition`) column.

use std::path::Path;

use tracing::{debug, warn};

use crate::entry::SeedEntry;
use crate::error::{LexiconError, Result};

const DEFAULT_TERMS: &[(&str, &str)] = &[
    ("API", "Application Programming Interface: a defined contract that lets one program call into another."),
    ("Kubernetes", "An open-source system for deploying, scaling and managing containerised applications across a cluster of machines."),
    ("Docker", "A platform that packages an application and its dependencies into portable containers."),
    ("Kafka", "Apache Kafka, a distributed event streaming platform built around an append-only, partitioned log."),
    ("PostgreSQL", "An open-source relational database known for standards compliance and extensibility."),
    ("Qdrant", "A vector database that stores embeddings and answers nearest-neighbour similarity queries."),
    ("OAuth", "An authorisation framework that lets an application act on a user's behalf without seeing their password."),
    ("JWT", "JSON Web Token: a compact, signed token carrying claims between two parties."),
    ("DNS", "Domain Name System: the service that translates host names into IP addresses."),
    ("VPN", "Virtual Private Network: an encrypted tunnel that extends a private network over a public one."),
    ("SSO", "Single sign-on: one authentication that grants access to several independent systems."),
    ("Zoom", "A video conferencing service for online meetings, webinars and chat."),
    ("Slack", "A workplace messaging platform organised around channels."),
    ("Jira", "An issue and project tracking tool used to plan and follow software work."),
    ("GitHub", "A hosting service for Git repositories with code review, issues and CI features."),
    ("WPA2-PSK", "Wi-Fi Protected Access 2 with a pre-shared key: a Wi-Fi security mode where every device uses the same passphrase."),
    ("Subnet", "A logical subdivision of an IP network that groups addresses sharing a common prefix."),
    ("LLM", "Large language model: a neural network trained on large text corpora to generate and understand language."),
    ("RAG", "Retrieval-augmented generation: answering with a language model that is given passages retrieved from a document index."),
    ("Embedding", "A dense numeric vector representing the meaning of a piece of text, used for similarity search."),
    ("Baobab", "A genus of long-lived deciduous trees native to Africa, Madagascar and Australia, whose fruit is rich in vitamin C."),
    ("SLA", "Service level agreement: a commitment between a provider and a client on measurable service quality."),
    ("CI/CD", "Continuous integration and continuous delivery: automatically building, testing and releasing every change."),
    ("Microservice", "A small, independently deployable service that owns one business capability."),
];

/// The built-in seed table.
pub fn default_seed() -> Vec<SeedEntry> {
    DEFAULT_TERMS.iter().map(|(name, definition)| SeedEntry::new(*name, *definition)).collect()
}

/// Read a dictionary CSV into seed rows.
///
/// Fields are trimmed. Rows whose name or definition is blank are skipped with
/// a warning; a malformed file is a [`LexiconError::SeedError`].
pub fn load_seed_csv(path: impl AsRef<Path>) -> Result<Vec<SeedEntry>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| LexiconError::SeedError(format!("{}: {e}", path.display())))?;

    let mut entries = Vec::new();
    for (line, record) in reader.deserialize::<SeedEntry>().enumerate() {
        let entry =
            record.map_err(|e| LexiconError::SeedError(format!("{}: {e}", path.display())))?;
        if entry.name.is_empty() || entry.definition.is_empty() {
            warn!(path = %path.display(), row = line + 1, "skipping blank seed row");
            continue;
        }
        entries.push(entry);
    }

    debug!(path = %path.display(), rows = entries.len(), "loaded seed csv");
    Ok(entries)
}
