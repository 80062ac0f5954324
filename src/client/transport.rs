//! Transports the request manager sends through.
//!
//! # Design Decisions
//! - One trait, two implementations: HTTP (reqwest) and in-process mock
//! - Futures are `'static` so the manager can share them between callers
//! - Both transports unwrap the `{ code, data, message }` envelope the same way

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use futures_util::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::client::{ApiRequest, RequestError};
use crate::config::RequestConfig;
use crate::mock::{ApiEnvelope, MockApi};

/// Something that can carry an [`ApiRequest`] to a backend.
pub trait Transport: Send + Sync {
    /// Send the request once and return the envelope's `data` on success.
    fn send(&self, request: &ApiRequest) -> BoxFuture<'static, Result<Value, RequestError>>;
}

/// Map an HTTP status plus decoded envelope to the caller-visible result.
pub fn settle_envelope(status: u16, envelope: ApiEnvelope) -> Result<Value, RequestError> {
    if !(200..300).contains(&status) {
        return Err(RequestError::Status {
            status,
            message: envelope.message,
        });
    }
    if envelope.code != 200 {
        return Err(RequestError::Business {
            code: envelope.code,
            message: envelope.message,
        });
    }
    Ok(envelope.data)
}

/// Transport backed by a real HTTP server.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    /// Create a transport from the `[requests]` config section.
    pub fn new(config: &RequestConfig) -> Result<Self, RequestError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RequestError::InvalidRequest(e.to_string()))?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Bearer token sent as the `Authorization` header.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn full_url(&self, request: &ApiRequest) -> String {
        let path = request.path_and_query();
        if path.starts_with("http://") || path.starts_with("https://") {
            path
        } else {
            format!("{}{}", self.base_url, path)
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> BoxFuture<'static, Result<Value, RequestError>> {
        let client = self.client.clone();
        let url = self.full_url(request);
        let method = request.method().clone();
        let body = request.body().clone();
        let token = self.token.clone();

        async move {
            let mut builder = client.request(method.clone(), &url);
            if let Some(token) = &token {
                builder = builder.bearer_auth(token);
            }
            if method != Method::GET && method != Method::HEAD && !body.is_null() {
                builder = builder.json(&body);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let text = response.text().await?;

            match serde_json::from_str::<ApiEnvelope>(&text) {
                Ok(envelope) => settle_envelope(status, envelope),
                Err(_) if !(200..300).contains(&status) => Err(RequestError::Status {
                    status,
                    message: text,
                }),
                Err(e) => Err(RequestError::Decode(e.to_string())),
            }
        }
        .boxed()
    }
}

/// Transport that dispatches straight into an in-process [`MockApi`].
#[derive(Clone)]
pub struct MockTransport {
    api: Arc<MockApi>,
    latency: Duration,
    token: Option<String>,
}

impl MockTransport {
    pub fn new(api: Arc<MockApi>) -> Self {
        Self {
            api,
            latency: Duration::ZERO,
            token: None,
        }
    }

    /// Simulated network latency per call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Bearer token sent as the `Authorization` header.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &ApiRequest) -> BoxFuture<'static, Result<Value, RequestError>> {
        let api = self.api.clone();
        let latency = self.latency;
        let authorization = self.token.as_ref().map(|t| format!("Bearer {t}"));
        let method = request.method().clone();
        let url = request.path_and_query();
        let body = if request.body().is_null() {
            String::new()
        } else {
            request.body().to_string()
        };

        async move {
            // Always yield once so concurrent callers observe the call as in flight.
            tokio::task::yield_now().await;
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            let response = api.dispatch(&method, &url, &body, authorization.as_deref());
            settle_envelope(response.status, response.envelope)
        }
        .boxed()
    }
}
