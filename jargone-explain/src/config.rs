//! Settings for the explanation pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{ExplainError, Result};
use crate::prompt::DetailLevel;

/// Token budget for one explanation.
pub const DEFAULT_MAX_TOKENS: u32 = 800;

/// Role assumed when a request does not name one.
pub const DEFAULT_ROLE: &str = "general reader";

/// Source name used for saved documents that do not name one.
pub const DEFAULT_SOURCE: &str = "file_upload";

/// Settings for [`Explainer`](crate::Explainer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainConfig {
    /// Detail level for requests that do not set one.
    pub default_detail_level: DetailLevel,
    /// Reader role for requests that do not set one.
    pub default_role: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Run lexicon resolution and passage retrieval at the same time.
    pub concurrent_retrieval: bool,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            default_detail_level: DetailLevel::default(),
            default_role: DEFAULT_ROLE.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            concurrent_retrieval: true,
        }
    }
}

impl ExplainConfig {
    pub fn builder() -> ExplainConfigBuilder {
        ExplainConfigBuilder::default()
    }
}

/// Builder for a validated [`ExplainConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExplainConfigBuilder {
    config: ExplainConfig,
}

impl ExplainConfigBuilder {
    pub fn default_detail_level(mut self, level: DetailLevel) -> Self {
        self.config.default_detail_level = level;
        self
    }

    pub fn default_role(mut self, role: impl Into<String>) -> Self {
        self.config.default_role = role.into();
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    pub fn concurrent_retrieval(mut self, enabled: bool) -> Self {
        self.config.concurrent_retrieval = enabled;
        self
    }

    /// Build the [`ExplainConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::Config`] if `max_tokens == 0` or the default
    /// role is blank.
    pub fn build(self) -> Result<ExplainConfig> {
        if self.config.max_tokens == 0 {
            return Err(ExplainError::Config("max_tokens must be greater than zero".into()));
        }
        if self.config.default_role.trim().is_empty() {
            return Err(ExplainError::Config("default_role must not be empty".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ExplainConfig::default();
        assert_eq!(config.max_tokens, 800);
        assert_eq!(config.default_detail_level, DetailLevel::High);
        assert!(config.concurrent_retrieval);
    }

    #[test]
    fn builder_rejects_zero_budget_and_blank_role() {
        assert!(ExplainConfig::builder().max_tokens(0).build().is_err());
        assert!(ExplainConfig::builder().default_role("  ").build().is_err());
        let config = ExplainConfig::builder()
            .default_detail_level(DetailLevel::Low)
            .concurrent_retrieval(false)
            .build()
            .unwrap();
        assert_eq!(config.default_detail_level, DetailLevel::Low);
        assert!(!config.concurrent_retrieval);
    }
}
