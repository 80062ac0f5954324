//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request attempt fails:
//!     → retries.rs (classify failure, check attempt budget)
//!     → backoff.rs (exponential delay + jitter, capped at 30s)
//!     → request manager sleeps and tries again
//! ```

pub mod backoff;
pub mod retries;

pub use retries::{is_retryable_status, RetryPolicy, RETRYABLE_STATUSES};
