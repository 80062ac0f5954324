//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and formats.
//! Every problem is reported, not just the first one.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// Upper bound for `requests.max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("server.base_path '{0}' must start with '/'")]
    InvalidBasePath(String),

    #[error("requests.max_retries {count} exceeds the limit of {limit}")]
    TooManyRetries { count: u32, limit: u32 },

    #[error("requests.retry_delay_ms must be greater than zero")]
    ZeroRetryDelay,

    #[error("requests.max_delay_ms {max} is below requests.retry_delay_ms {base}")]
    DelayCapBelowBase { base: u64, max: u64 },

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.server.bind_address.clone(),
        ));
    }

    if !config.server.base_path.starts_with('/') {
        errors.push(ValidationError::InvalidBasePath(config.server.base_path.clone()));
    }

    let requests = &config.requests;
    if requests.max_retries > MAX_RETRIES_LIMIT {
        errors.push(ValidationError::TooManyRetries {
            count: requests.max_retries,
            limit: MAX_RETRIES_LIMIT,
        });
    }
    if requests.retry_delay_ms == 0 {
        errors.push(ValidationError::ZeroRetryDelay);
    }
    if requests.max_delay_ms < requests.retry_delay_ms {
        errors.push(ValidationError::DelayCapBelowBase {
            base: requests.retry_delay_ms,
            max: requests.max_delay_ms,
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
