//! Prompt assembly for the generative model.
//!
//! The composer turns a sentence, the retrieved passages and the resolved
//! definitions into a system instruction plus a user message. The user
//! message carries a JSON context block with `sources` and `dictionary`
//! fields; those names are what the instruction refers to, so they are kept
//! stable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExplainError;

/// Instruction sent as the system message unless overridden.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You rewrite sentences full of technical jargon so \
that a lay reader understands them. Use only the information in the Context block: `sources` \
holds passages from indexed documents and `dictionary` holds definitions of terms found in the \
sentence. When the detail level is high, expand each term into a short plain-language \
explanation; when it is low, replace each term with the simplest accurate wording. Adapt \
vocabulary and examples to the reader's role. If the context holds nothing relevant to the \
sentence, return the sentence exactly as given.";

/// How much the explanation may expand the original sentence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// Explain each term in a clause of its own.
    #[default]
    High,
    /// Keep the sentence short; swap terms for plain words.
    Low,
}

impl DetailLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailLevel {
    type Err = ExplainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            other => Err(ExplainError::InvalidInput(format!(
                "unknown detail level '{other}', expected 'high' or 'low'"
            ))),
        }
    }
}

/// A `(name, definition)` pair placed in the prompt dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub name: String,
    pub definition: String,
}

impl DictionaryEntry {
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self { name: name.into(), definition: definition.into() }
    }
}

#[derive(Serialize)]
struct PromptContext<'a> {
    sources: &'a [String],
    dictionary: &'a [DictionaryEntry],
}

/// The two messages sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    /// The system message.
    pub system: String,
    /// The user message with context, sentence, detail level and role.
    pub user: String,
}

impl ComposedPrompt {
    /// Join both parts into one instruction string.
    pub fn into_instruction(self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

/// Builds [`ComposedPrompt`]s.
///
/// # Example
///
/// ```rust,ignore
/// use jargone_explain::{DetailLevel, DictionaryEntry, PromptComposer};
///
/// let prompt = PromptComposer::new().compose(
///     "Rotate the WPA2-PSK.",
///     &[],
///     &[DictionaryEntry::new("wpa2-psk", "A shared Wi-Fi password scheme.")],
///     DetailLevel::Low,
///     "accountant",
/// )?;
/// ```
#[derive(Debug, Clone)]
pub struct PromptComposer {
    system_instruction: String,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self { system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string() }
    }
}

impl PromptComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Compose the prompt for one sentence.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::InvalidInput`] if the context block cannot be
    /// encoded as JSON.
    pub fn compose(
        &self,
        sentence: &str,
        passages: &[String],
        entities: &[DictionaryEntry],
        detail_level: DetailLevel,
        role: &str,
    ) -> crate::error::Result<ComposedPrompt> {
        let context = PromptContext { sources: passages, dictionary: entities };
        let context = serde_json::to_string_pretty(&context).map_err(|e| {
            ExplainError::InvalidInput(format!("prompt context could not be encoded: {e}"))
        })?;

        let user = format!(
            "Context:\n{context}\n\nSentence: {sentence}\nDetail level: {detail_level}\nRole: {role}"
        );
        Ok(ComposedPrompt { system: self.system_instruction.clone(), user })
    }
}
