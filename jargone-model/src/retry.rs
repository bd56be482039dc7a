//! Retry with exponential backoff around any [`GenerativeProvider`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::error::{ModelError, Result};
use crate::provider::GenerativeProvider;

/// How many times to try a call and how long to wait in between.
///
/// Built through [`RetryPolicy::builder`], which rejects policies whose
/// delays could shrink or overflow.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(750),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    /// Create a new builder for constructing a [`RetryPolicy`].
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Total attempts, including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the second attempt.
    pub fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }

    /// Upper bound on any single delay.
    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// Factor applied to the delay after each retry.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31) as i32;
        let factor = self.multiplier.powi(exponent);
        let uncapped = self.initial_backoff.as_secs_f64() * factor;
        if !uncapped.is_finite() || uncapped >= self.max_backoff.as_secs_f64() {
            return self.max_backoff;
        }
        self.initial_backoff.mul_f64(factor)
    }
}

/// Builder for constructing a validated [`RetryPolicy`].
#[derive(Debug, Clone, Default)]
pub struct RetryPolicyBuilder {
    policy: RetryPolicy,
}

impl RetryPolicyBuilder {
    /// Set the total number of attempts.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.policy.max_attempts = attempts;
        self
    }

    /// Set the first delay.
    pub fn initial_backoff(mut self, backoff: Duration) -> Self {
        self.policy.initial_backoff = backoff;
        self
    }

    /// Set the delay cap.
    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.policy.max_backoff = backoff;
        self
    }

    /// Set the growth factor.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.policy.multiplier = multiplier;
        self
    }

    /// Build the [`RetryPolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] if `max_attempts == 0`, the multiplier is
    /// below 1, or `initial_backoff > max_backoff`.
    pub fn build(self) -> Result<RetryPolicy> {
        let policy = self.policy;
        if policy.max_attempts == 0 {
            return Err(ModelError::Config("max_attempts must be at least 1".into()));
        }
        if policy.multiplier.is_nan() || policy.multiplier < 1.0 {
            return Err(ModelError::Config("multiplier must be at least 1.0".into()));
        }
        if policy.initial_backoff > policy.max_backoff {
            return Err(ModelError::Config("initial_backoff must not exceed max_backoff".into()));
        }
        Ok(policy)
    }
}

/// Wraps a provider and retries retryable failures.
///
/// Only errors for which [`ModelError::is_retryable`] holds are retried;
/// anything else is returned immediately.
///
/// # Example
///
/// ```rust,ignore
/// use jargone_model::{RetryPolicy, RetryingGenerator};
///
/// let model = RetryingGenerator::new(openai, RetryPolicy::default());
/// ```
#[derive(Debug)]
pub struct RetryingGenerator<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: GenerativeProvider> RetryingGenerator<P> {
    /// Wrap `inner` with `policy`.
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// The active policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<P: GenerativeProvider> GenerativeProvider for RetryingGenerator<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String> {
        let mut attempt = 1;
        loop {
            match self.inner.complete(system_prompt, user_prompt, max_tokens).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        provider = self.inner.name(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying completion"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(provider = self.inner.name(), attempt, error = %e, "completion failed");
                    return Err(e);
                }
            }
        }
    }
}
