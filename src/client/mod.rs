//! API client subsystem.
//!
//! # Data Flow
//! ```text
//! Call site
//!     → request.rs (typed ApiRequest, dedupe key)
//!     → manager.rs (join in-flight call or start a new attempt sequence)
//!     → resilience (retry decision + backoff between attempts)
//!     → transport.rs (HTTP via reqwest, or in-process MockApi)
//!     → envelope unwrapped into data or RequestError
//! ```

pub mod error;
pub mod manager;
pub mod request;
pub mod transport;

pub use error::RequestError;
pub use manager::{execute_with_retry, RequestManager};
pub use request::ApiRequest;
pub use transport::{settle_envelope, HttpTransport, MockTransport, Transport};
