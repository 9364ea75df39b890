//! Retries for transient model failures.
//!
//! [`RetryingLlm`] wraps any [`LlmClient`] and re-sends a request after
//! `Unavailable` or `Timeout`, waiting as the [`RetryPolicy`] says. Schema
//! violations are returned at once: asking again is the agent's call.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::warn;

use super::{LlmClient, LlmError, LlmResponse, OutputSchema};
use crate::message::Message;

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RetryPolicy {
    /// Fail on the first error.
    #[default]
    None,
    /// Constant delay between attempts.
    Fixed {
        max_retries: usize,
        interval: Duration,
    },
    /// Delay grows by `multiplier` per retry, capped at `max_interval`.
    Exponential {
        max_retries: usize,
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
    },
}

impl RetryPolicy {
    pub fn none() -> Self {
        RetryPolicy::None
    }

    pub fn fixed(max_retries: usize, interval: Duration) -> Self {
        RetryPolicy::Fixed {
            max_retries,
            interval,
        }
    }

    pub fn exponential(
        max_retries: usize,
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
    ) -> Self {
        RetryPolicy::Exponential {
            max_retries,
            initial_interval,
            max_interval,
            multiplier,
        }
    }

    /// `retry` is the number of retries already made.
    pub fn should_retry(&self, retry: usize) -> bool {
        retry < self.max_retries()
    }

    /// Wait before retry number `retry` (0-based).
    pub fn delay(&self, retry: usize) -> Duration {
        match self {
            RetryPolicy::None => Duration::ZERO,
            RetryPolicy::Fixed { interval, .. } => *interval,
            RetryPolicy::Exponential {
                initial_interval,
                max_interval,
                multiplier,
                ..
            } => {
                let secs = initial_interval.as_secs_f64() * multiplier.powi(retry as i32);
                Duration::from_secs_f64(secs).min(*max_interval)
            }
        }
    }

    pub fn max_retries(&self) -> usize {
        match self {
            RetryPolicy::None => 0,
            RetryPolicy::Fixed { max_retries, .. } => *max_retries,
            RetryPolicy::Exponential { max_retries, .. } => *max_retries,
        }
    }
}

/// Client wrapper that retries transient failures.
pub struct RetryingLlm<L> {
    inner: L,
    policy: RetryPolicy,
}

impl<L: LlmClient> RetryingLlm<L> {
    pub fn new(inner: L, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    async fn backoff(&self, retry: usize, err: &LlmError) {
        let delay = self.policy.delay(retry);
        warn!(retry = retry + 1, ?delay, error = %err, "model call failed, retrying");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl<L: LlmClient> LlmClient for RetryingLlm<L> {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        let mut retry = 0;
        loop {
            match self.inner.invoke(messages).await {
                Err(e) if e.is_transient() && self.policy.should_retry(retry) => {
                    self.backoff(retry, &e).await;
                    retry += 1;
                }
                other => return other,
            }
        }
    }

    async fn invoke_structured(
        &self,
        prompt: &str,
        schema: &OutputSchema,
    ) -> Result<Map<String, Value>, LlmError> {
        let mut retry = 0;
        loop {
            match self.inner.invoke_structured(prompt, schema).await {
                Err(e) if e.is_transient() && self.policy.should_retry(retry) => {
                    self.backoff(retry, &e).await;
                    retry += 1;
                }
                other => return other,
            }
        }
    }
}
