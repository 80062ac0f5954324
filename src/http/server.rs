//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router mounting the mock API under the base path
//! - Wire up middleware (tracing, timeout, request ID, CORS headers)
//! - Answer `OPTIONS` preflights with 204
//! - Translate HTTP requests into `MockApi::dispatch` calls

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::request::MakeRequestUuidV4;
use crate::lifecycle::wait_for_signal;
use crate::mock::MockApi;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<MockApi>,
    pub base_path: String,
    pub delay: Duration,
}

/// HTTP server exposing a [`MockApi`].
pub struct MockServer {
    router: Router,
    config: AppConfig,
}

impl MockServer {
    pub fn new(config: AppConfig, api: Arc<MockApi>) -> Self {
        let state = AppState {
            api,
            base_path: normalize_base_path(&config.server.base_path),
            delay: Duration::from_millis(config.mock.delay_ms),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let wildcard = format!("{}/{{*path}}", state.base_path);
        let root = if state.base_path.is_empty() {
            "/".to_string()
        } else {
            state.base_path.clone()
        };

        Router::new()
            .route(&wildcard, any(mock_handler))
            .route(&root, any(mock_handler))
            .with_state(state)
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, POST, PUT, PATCH, DELETE, OPTIONS"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type, Authorization"),
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
            .layer(TraceLayer::new_for_http())
    }

    /// The configured router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            base_path = %self.config.server.base_path,
            "Mock API server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_signal(shutdown))
            .await?;

        tracing::info!("Mock API server stopped");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

fn normalize_base_path(base_path: &str) -> String {
    base_path.trim_end_matches('/').to_string()
}

/// Catch-all handler forwarding to the mock dispatcher.
async fn mock_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }

    let path = uri
        .path()
        .strip_prefix(state.base_path.as_str())
        .filter(|p| !p.is_empty())
        .unwrap_or("/");
    let url = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    let body = String::from_utf8_lossy(&body);
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let response = state.api.dispatch(&method, &url, &body, authorization);
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
    (status, Json(response.envelope)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDb;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> Router {
        let config = AppConfig::default();
        let api = Arc::new(MockApi::new(Arc::new(MockDb::seeded()), &config.mock));
        MockServer::new(config, api).router()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_options_short_circuits_with_cors() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/mock-api/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_headers_on_plain_get() {
        let response = router()
            .oneshot(Request::builder().uri("/mock-api/tags").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "GET, POST, PUT, PATCH, DELETE, OPTIONS"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            "Content-Type, Authorization"
        );
    }

    #[tokio::test]
    async fn test_get_users_under_base_path() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/mock-api/users?page=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-request-id").is_some());
        let body = body_json(response).await;
        assert_eq!(body["code"], 200);
        assert_eq!(body["data"]["list"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_envelope() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/mock-api/nothing-here")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "code": 404, "data": null, "message": "接口不存在" })
        );
    }

    #[tokio::test]
    async fn test_post_with_malformed_body() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/mock-api/categories")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{broken"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["id"], 6);
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("/mock-api/"), "/mock-api");
        assert_eq!(normalize_base_path("/"), "");
    }
}
