//! Retry logic.
//!
//! # Responsibilities
//! - Determine if a failed request is retryable
//! - Compute the delay before the next attempt
//!
//! # Design Decisions
//! - Failures without a response (network errors) are always retryable
//! - Only timeouts, throttling and gateway-class 5xx statuses are retried
//! - Business errors from the envelope are final

use std::time::Duration;

use crate::client::RequestError;
use crate::config::RequestConfig;
use crate::resilience::backoff::{calculate_backoff, MAX_DELAY_MS};

/// HTTP statuses worth another attempt.
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Returns true if the HTTP status is transient.
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Bounded retry policy used by the request manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub enabled: bool,
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_ms: u64,
    pub exponential: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: MAX_DELAY_MS,
            jitter_ms: 1000,
            exponential: true,
        }
    }
}

impl RetryPolicy {
    /// Build a policy from the `[requests]` config section.
    pub fn from_config(config: &RequestConfig) -> Self {
        Self {
            enabled: config.enable_retry,
            max_retries: config.max_retries,
            base_delay_ms: config.retry_delay_ms,
            max_delay_ms: config.max_delay_ms.min(MAX_DELAY_MS),
            jitter_ms: config.jitter_ms,
            exponential: config.use_exponential_backoff,
        }
    }

    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Decide whether a failure on zero-based `attempt` gets another try.
    pub fn should_retry(&self, err: &RequestError, attempt: u32) -> bool {
        if !self.enabled || attempt >= self.max_retries {
            return false;
        }
        match err {
            RequestError::Network(_) => true,
            RequestError::Status { status, .. } => is_retryable_status(*status),
            RequestError::Business { .. }
            | RequestError::Decode(_)
            | RequestError::InvalidRequest(_) => false,
        }
    }

    /// Delay to wait after a failure on zero-based `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.exponential {
            calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms, self.jitter_ms)
        } else {
            Duration::from_millis(self.base_delay_ms.min(self.max_delay_ms))
        }
    }
}
