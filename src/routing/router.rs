//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up the handler for a `(method, url)` pair
//! - Return the matched route or an explicit no-match
//!
//! # Design Decisions
//! - Exact `"METHOD /path"` lookups are O(1) and always win
//! - Parameterized and prefix scans are O(n) in registration order
//! - First match wins within each step

use std::collections::HashMap;

use axum::http::Method;

use crate::routing::matcher::{pathname, PathParams, PathPattern};

/// A registered route.
#[derive(Debug, Clone)]
pub struct RouteEntry<H> {
    pub method: Method,
    pub pattern: PathPattern,
    pub handler: H,
}

/// Which lookup step produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Parameterized,
    Prefix,
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    pub handler: &'a H,
    pub pattern: &'a str,
    pub params: PathParams,
    pub kind: MatchKind,
}

/// Maps `(method, path)` pairs to handlers.
#[derive(Debug, Clone)]
pub struct RouteResolver<H> {
    routes: Vec<RouteEntry<H>>,
    exact: HashMap<String, usize>,
}

impl<H> Default for RouteResolver<H> {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            exact: HashMap::new(),
        }
    }
}

fn exact_key(method: &Method, path: &str) -> String {
    format!("{method} {path}")
}

impl<H> RouteResolver<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route. The first registration of an identical
    /// `METHOD pattern` pair keeps the exact-match slot.
    pub fn register(&mut self, method: Method, pattern: &str, handler: H) {
        let index = self.routes.len();
        let key = exact_key(&method, pattern);
        if self.exact.contains_key(&key) {
            tracing::warn!(route = %key, "Duplicate route registration");
        } else {
            self.exact.insert(key, index);
        }
        self.routes.push(RouteEntry {
            method,
            pattern: PathPattern::compile(pattern),
            handler,
        });
    }

    /// Builder-style [`register`](Self::register).
    pub fn route(mut self, method: Method, pattern: &str, handler: H) -> Self {
        self.register(method, pattern, handler);
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> &[RouteEntry<H>] {
        &self.routes
    }

    /// Find the handler for `method` and `url` (query string allowed).
    ///
    /// Lookup order: exact match, then parameterized match, then prefix
    /// match for patterns ending in `/`.
    pub fn find_handler(&self, method: &Method, url: &str) -> Option<RouteMatch<'_, H>> {
        let path = pathname(url);

        if let Some(&index) = self.exact.get(&exact_key(method, path)) {
            let entry = &self.routes[index];
            return Some(RouteMatch {
                handler: &entry.handler,
                pattern: entry.pattern.as_str(),
                params: entry.pattern.match_path(path).unwrap_or_default(),
                kind: MatchKind::Exact,
            });
        }

        let same_method = move || self.routes.iter().filter(move |r| &r.method == method);

        for entry in same_method() {
            if let Some(params) = entry.pattern.match_path(path) {
                return Some(RouteMatch {
                    handler: &entry.handler,
                    pattern: entry.pattern.as_str(),
                    params,
                    kind: MatchKind::Parameterized,
                });
            }
        }

        same_method()
            .find(|entry| entry.pattern.matches_prefix(path))
            .map(|entry| RouteMatch {
                handler: &entry.handler,
                pattern: entry.pattern.as_str(),
                params: PathParams::new(),
                kind: MatchKind::Prefix,
            })
    }
}
