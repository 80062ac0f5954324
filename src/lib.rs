//! Admin dashboard API toolkit.
//!
//! A de-duplicating, retrying request manager, an in-memory mock backend
//! served over axum, and the smart-form field-condition evaluator.

pub mod client;
pub mod config;
pub mod forms;
pub mod http;
pub mod lifecycle;
pub mod mock;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use client::{ApiRequest, RequestError, RequestManager};
pub use config::schema::AppConfig;
pub use http::MockServer;
pub use lifecycle::Shutdown;
pub use mock::{MockApi, MockDb};
