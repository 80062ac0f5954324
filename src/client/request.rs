//! Request descriptors.
//!
//! A request is built through one constructor per verb, each of which
//! validates the URL. Query parameters live in an ordered map so the
//! de-duplication key is deterministic regardless of insertion order.

use std::collections::BTreeMap;

use axum::http::Method;
use serde_json::Value;

use crate::client::RequestError;

/// An outbound API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    url: String,
    params: BTreeMap<String, Value>,
    body: Value,
}

impl ApiRequest {
    /// Create a request, rejecting empty or relative-without-slash URLs.
    pub fn new(method: Method, url: impl Into<String>) -> Result<Self, RequestError> {
        let url = url.into();
        if url.is_empty() {
            return Err(RequestError::InvalidRequest("url must not be empty".into()));
        }
        if !(url.starts_with('/') || url.starts_with("http://") || url.starts_with("https://")) {
            return Err(RequestError::InvalidRequest(format!(
                "url '{url}' must start with '/' or an http(s) scheme"
            )));
        }
        Ok(Self {
            method,
            url,
            params: BTreeMap::new(),
            body: Value::Null,
        })
    }

    pub fn get(url: impl Into<String>) -> Result<Self, RequestError> {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>, body: Value) -> Result<Self, RequestError> {
        Ok(Self::new(Method::POST, url)?.with_body(body))
    }

    pub fn put(url: impl Into<String>, body: Value) -> Result<Self, RequestError> {
        Ok(Self::new(Method::PUT, url)?.with_body(body))
    }

    pub fn patch(url: impl Into<String>, body: Value) -> Result<Self, RequestError> {
        Ok(Self::new(Method::PATCH, url)?.with_body(body))
    }

    pub fn delete(url: impl Into<String>) -> Result<Self, RequestError> {
        Self::new(Method::DELETE, url)
    }

    /// Add a query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Replace the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Key shared by requests that must collapse into one in-flight call:
    /// `METHOD:url:JSON(params):JSON(body)`.
    pub fn dedupe_key(&self) -> String {
        let params = serde_json::to_string(&self.params).unwrap_or_default();
        let body = serde_json::to_string(&self.body).unwrap_or_default();
        format!("{}:{}:{}:{}", self.method, self.url, params, body)
    }

    /// Params rendered as a query string (`a=1&b=x`), empty when there are none.
    pub fn query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            match value {
                Value::Null => continue,
                Value::String(s) => serializer.append_pair(key, s),
                other => serializer.append_pair(key, &other.to_string()),
            };
        }
        serializer.finish()
    }

    /// URL with the query string appended.
    pub fn path_and_query(&self) -> String {
        let query = self.query_string();
        if query.is_empty() {
            self.url.clone()
        } else if self.url.contains('?') {
            format!("{}&{}", self.url, query)
        } else {
            format!("{}?{}", self.url, query)
        }
    }
}
