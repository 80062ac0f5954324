//! Request failure taxonomy.

use thiserror::Error;

/// Failure of a request issued through the [`RequestManager`](super::RequestManager).
///
/// The type is `Clone` so a single settled result can be handed to every
/// caller that joined the same in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// No response was received (connect failure, reset, transport timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The envelope carried a `code` other than 200.
    #[error("business error {code}: {message}")]
    Business { code: i64, message: String },

    /// The response body was not a valid envelope.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request was rejected before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RequestError {
    /// HTTP status carried by the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the failure happened before any response arrived.
    pub fn is_network(&self) -> bool {
        matches!(self, RequestError::Network(_))
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            RequestError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            RequestError::Decode(err.to_string())
        } else {
            RequestError::Network(err.to_string())
        }
    }
}
