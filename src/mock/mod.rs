//! In-memory mock backend.
//!
//! # Data Flow
//! ```text
//! (method, url, body, authorization)
//!     → MockApi::dispatch
//!     → routing::RouteResolver (exact → parameterized → prefix)
//!     → handlers/* against the injected MockDb
//!     → MockResponse { status, envelope }
//! ```
//!
//! # Design Decisions
//! - Dispatch never fails: bad bodies become `{}`, unknown routes a 404 envelope
//! - The store is injected, so independent instances never share state
//! - Writes are process-local and lost on restart

pub mod envelope;
pub mod handlers;
pub mod seed;
pub mod store;

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use serde_json::{Map, Value};

use crate::config::MockConfig;
use crate::observability::metrics;
use crate::routing::RouteResolver;

pub use envelope::{ApiEnvelope, Page};
pub use handlers::{Handler, MockRequest};
pub use store::{Collection, MockDb, RESOURCES};

/// What the mock layer answers with.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: u16,
    pub envelope: ApiEnvelope,
}

impl MockResponse {
    /// HTTP status mirrors the envelope only for auth and not-found errors;
    /// other business failures travel as 200 with a non-200 `code`.
    pub fn from_envelope(envelope: ApiEnvelope) -> Self {
        let status = match envelope.code {
            401 => 401,
            404 => 404,
            _ => 200,
        };
        Self { status, envelope }
    }
}

/// Route table plus the store it operates on.
pub struct MockApi {
    resolver: RouteResolver<Handler>,
    db: Arc<MockDb>,
    not_found_message: String,
}

impl MockApi {
    /// Build the full mock API over `db`.
    pub fn new(db: Arc<MockDb>, config: &MockConfig) -> Self {
        Self::with_routes(handlers::routes(), db, config)
    }

    /// Build a mock API over a custom route table.
    pub fn with_routes(resolver: RouteResolver<Handler>, db: Arc<MockDb>, config: &MockConfig) -> Self {
        tracing::debug!(routes = resolver.len(), "Mock routes registered");
        Self {
            resolver,
            db,
            not_found_message: config.not_found_message.clone(),
        }
    }

    pub fn db(&self) -> &Arc<MockDb> {
        &self.db
    }

    pub fn resolver(&self) -> &RouteResolver<Handler> {
        &self.resolver
    }

    /// Route a call to its handler.
    ///
    /// `url` is relative to the mock base path and may carry a query string.
    pub fn dispatch(
        &self,
        method: &Method,
        url: &str,
        body: &str,
        authorization: Option<&str>,
    ) -> MockResponse {
        let Some(route) = self.resolver.find_handler(method, url) else {
            tracing::debug!(method = %method, url = %url, "No mock route matched");
            metrics::record_mock_request(method.as_str(), 404);
            return MockResponse {
                status: 404,
                envelope: ApiEnvelope::error(404, self.not_found_message.clone()),
            };
        };

        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (url, HashMap::new()),
        };

        let request = MockRequest {
            method: method.clone(),
            path: path.to_string(),
            params: route.params,
            query,
            body: parse_body(body),
            token: authorization.map(|h| h.strip_prefix("Bearer ").unwrap_or(h).trim().to_string()),
        };

        let response = MockResponse::from_envelope((route.handler)(&request, self.db.as_ref()));
        tracing::debug!(
            method = %method,
            pattern = route.pattern,
            status = response.status,
            code = response.envelope.code,
            "Mock request handled"
        );
        metrics::record_mock_request(method.as_str(), response.status);
        response
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Parse a JSON body; empty or malformed input becomes `{}`.
pub fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Object(Map::new());
    }
    match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed request body, using empty object");
            Value::Object(Map::new())
        }
    }
}
