//! Mock endpoint handlers.
//!
//! Handlers are plain functions of the request and the injected [`MockDb`];
//! they never fail, every outcome is an [`ApiEnvelope`].

pub mod analytics;
pub mod auth;
pub mod crud;

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use serde_json::Value;

use crate::mock::envelope::ApiEnvelope;
use crate::mock::store::{MockDb, RESOURCES};
use crate::routing::{PathParams, RouteResolver};

/// A mock endpoint.
pub type Handler = Arc<dyn Fn(&MockRequest, &MockDb) -> ApiEnvelope + Send + Sync>;

/// Everything a handler gets to see about the incoming call.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: Method,
    pub path: String,
    pub params: PathParams,
    pub query: HashMap<String, String>,
    pub body: Value,
    pub token: Option<String>,
}

impl MockRequest {
    /// The `:id` path parameter as a number.
    pub fn id(&self) -> Option<u64> {
        self.params.get("id").and_then(|id| id.parse().ok())
    }

    /// A numeric query parameter, falling back to `default`.
    pub fn query_usize(&self, key: &str, default: usize) -> usize {
        self.query
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

/// Wrap a handler function.
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&MockRequest, &MockDb) -> ApiEnvelope + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Every mock route, in registration order.
pub fn routes() -> RouteResolver<Handler> {
    let mut resolver = RouteResolver::new();

    auth::register(&mut resolver);
    for resource in RESOURCES {
        crud::register(&mut resolver, resource);
    }
    analytics::register(&mut resolver);

    resolver
}
