//! Request manager behaviour against the mock backend and a flaky HTTP backend.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use serde_json::{json, Value};

use dashboard_api::client::{ApiRequest, HttpTransport, MockTransport, RequestError, Transport};
use dashboard_api::resilience::RetryPolicy;
use dashboard_api::RequestManager;

mod common;

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        base_delay_ms: 10,
        jitter_ms: 0,
        ..RetryPolicy::default()
    }
}

#[tokio::test]
async fn test_concurrent_identical_gets_share_one_call() {
    let (transport, calls) = common::CountingTransport::new(MockTransport::new(common::seeded_api()));
    let manager = RequestManager::new(Arc::new(transport));

    let request = ApiRequest::get("/users").unwrap().with_param("page", 1);
    let (a, b) = tokio::join!(manager.execute(request.clone()), manager.execute(request.clone()));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let a = a.unwrap();
    assert_eq!(a, b.unwrap());
    assert_eq!(a["list"].as_array().unwrap().len(), 10);
    assert_eq!(manager.pending_count(), 0);

    // settled, so the next identical call goes to the backend again
    manager.execute(request).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_different_params_are_not_merged() {
    let (transport, calls) = common::CountingTransport::new(MockTransport::new(common::seeded_api()));
    let manager = RequestManager::new(Arc::new(transport));

    let page1 = ApiRequest::get("/users").unwrap().with_param("page", 1);
    let page2 = ApiRequest::get("/users").unwrap().with_param("page", 2);
    let (a, b) = tokio::join!(manager.execute(page1), manager.execute(page2));

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(a.is_ok() && b.is_ok());
}

#[tokio::test]
async fn test_dedupe_disabled_sends_every_call() {
    let (transport, calls) = common::CountingTransport::new(MockTransport::new(common::seeded_api()));
    let manager = RequestManager::new(Arc::new(transport)).with_dedupe(false);

    let request = ApiRequest::get("/products").unwrap();
    let (a, b) = tokio::join!(manager.execute(request.clone()), manager.execute(request));

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(a.unwrap(), b.unwrap());
}

#[tokio::test]
async fn test_business_error_is_not_retried() {
    let (transport, calls) = common::CountingTransport::new(MockTransport::new(common::seeded_api()));
    let manager = RequestManager::new(Arc::new(transport)).with_policy(fast_policy());

    let login = ApiRequest::post(
        "/auth/login",
        json!({ "username": "admin", "password": "wrong" }),
    )
    .unwrap();
    let err = manager.execute(login).await.unwrap_err();

    assert!(matches!(err, RequestError::Business { code: 400, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_token_surfaces_401() {
    let manager = RequestManager::new(Arc::new(MockTransport::new(common::seeded_api())))
        .with_policy(fast_policy());

    let err = manager.execute(ApiRequest::get("/auth/me").unwrap()).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_http_transport_retries_until_success() {
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();
    let addr = common::start_programmable_backend(move || {
        let counter = counter.clone();
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                (503, "Service Unavailable".to_string())
            } else {
                (200, json!({ "code": 200, "data": { "ok": true }, "message": "success" }).to_string())
            }
        }
    })
    .await;

    let transport = HttpTransport::with_client(reqwest::Client::new(), format!("http://{addr}"));
    let manager = RequestManager::new(Arc::new(transport)).with_policy(fast_policy());

    let data = manager.execute(ApiRequest::get("/health").unwrap()).await.unwrap();
    assert_eq!(data, json!({ "ok": true }));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_http_transport_gives_up_after_max_retries() {
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();
    let addr = common::start_programmable_backend(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async { (500, "boom".to_string()) }
    })
    .await;

    let transport = HttpTransport::with_client(reqwest::Client::new(), format!("http://{addr}"));
    let manager = RequestManager::new(Arc::new(transport)).with_policy(fast_policy());

    let err = manager.execute(ApiRequest::get("/always-down").unwrap()).await.unwrap_err();
    assert_eq!(err, RequestError::Status { status: 500, message: "boom".into() });
    assert_eq!(hits.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_http_transport_does_not_retry_400() {
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();
    let addr = common::start_programmable_backend(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async { (400, "bad".to_string()) }
    })
    .await;

    let transport = HttpTransport::with_client(reqwest::Client::new(), format!("http://{addr}"));
    let manager = RequestManager::new(Arc::new(transport)).with_policy(fast_policy());

    let err = manager.execute(ApiRequest::get("/bad").unwrap()).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

/// Always fails with a network error, without touching real I/O.
struct Unreachable {
    calls: Arc<AtomicUsize>,
}

impl Transport for Unreachable {
    fn send(&self, _request: &ApiRequest) -> BoxFuture<'static, Result<Value, RequestError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async { Err(RequestError::Network("connection refused".into())) }.boxed()
    }
}

#[tokio::test(start_paused = true)]
async fn test_backoff_schedule_doubles_between_attempts() {
    let calls = Arc::new(AtomicUsize::new(0));
    let manager = RequestManager::new(Arc::new(Unreachable { calls: calls.clone() })).with_policy(
        RetryPolicy {
            jitter_ms: 0,
            ..RetryPolicy::default()
        },
    );

    let start = tokio::time::Instant::now();
    let err = manager.execute(ApiRequest::get("/users").unwrap()).await.unwrap_err();

    assert!(err.is_network());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    // 1s + 2s + 4s
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(7), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(7100), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_joined_callers_share_the_retried_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let manager = RequestManager::new(Arc::new(Unreachable { calls: calls.clone() }))
        .with_policy(fast_policy());

    let request = ApiRequest::get("/orders").unwrap();
    let (a, b) = tokio::join!(manager.execute(request.clone()), manager.execute(request));

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(a.unwrap_err(), b.unwrap_err());
}
