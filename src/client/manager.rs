//! Request de-duplication and retry.
//!
//! # Responsibilities
//! - Collapse concurrent identical requests into one in-flight call
//! - Retry transient failures with exponential backoff and jitter
//! - Remove pending entries when the call settles, however it settles
//!
//! # Design Decisions
//! - Pending calls are `Shared` futures; the map only keeps a weak handle,
//!   so a sequence every caller abandoned never blocks later callers
//! - Cleanup is a drop guard living inside the shared future
//! - Entries carry a generation id so stale guards never evict newer entries

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared, WeakShared};
use serde_json::Value;

use crate::client::{ApiRequest, RequestError, Transport};
use crate::config::RequestConfig;
use crate::observability::metrics;
use crate::resilience::RetryPolicy;

type SharedResult = Shared<BoxFuture<'static, Result<Value, RequestError>>>;
type PendingMap = DashMap<String, PendingEntry>;

struct PendingEntry {
    id: u64,
    // `Shared::downgrade` yields None once the future has completed; such an
    // entry is replaced on the next lookup.
    handle: Option<WeakShared<BoxFuture<'static, Result<Value, RequestError>>>>,
}

/// Removes its pending entry when the attempt sequence settles or is dropped.
struct PendingGuard {
    pending: Arc<PendingMap>,
    key: String,
    id: u64,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let id = self.id;
        self.pending.remove_if(&self.key, |_, entry| entry.id == id);
    }
}

/// Wraps a [`Transport`] with de-duplication and retries.
pub struct RequestManager {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    enable_dedupe: bool,
    pending: Arc<PendingMap>,
    next_id: AtomicU64,
}

impl RequestManager {
    /// Create a manager with the default policy (dedupe on, 3 retries).
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
            enable_dedupe: true,
            pending: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Create a manager from the `[requests]` config section.
    pub fn from_config(transport: Arc<dyn Transport>, config: &RequestConfig) -> Self {
        Self::new(transport)
            .with_policy(RetryPolicy::from_config(config))
            .with_dedupe(config.enable_dedupe)
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_dedupe(mut self, enabled: bool) -> Self {
        self.enable_dedupe = enabled;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Number of keys with a call in flight.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Forget every pending call. In-flight calls keep running and still
    /// resolve for the callers already waiting on them.
    pub fn cancel_all(&self) {
        let dropped = self.pending.len();
        self.pending.clear();
        tracing::debug!(dropped, "Cleared pending requests");
    }

    /// Execute a request, joining an identical in-flight call if one exists.
    pub async fn execute(&self, request: ApiRequest) -> Result<Value, RequestError> {
        if !self.enable_dedupe {
            return execute_with_retry(self.transport.clone(), self.policy, request).await;
        }

        let key = request.dedupe_key();
        let shared = match self.pending.entry(key.clone()) {
            Entry::Occupied(mut occupied) => match occupied.get().handle.as_ref().and_then(WeakShared::upgrade) {
                Some(handle) => {
                    tracing::debug!(key = %key, "Joining in-flight request");
                    metrics::record_dedupe_hit();
                    handle
                }
                None => {
                    let (entry, handle) = self.start_sequence(key.clone(), request);
                    occupied.insert(entry);
                    handle
                }
            },
            Entry::Vacant(vacant) => {
                let (entry, handle) = self.start_sequence(key.clone(), request);
                vacant.insert(entry);
                handle
            }
        };

        shared.await
    }

    fn start_sequence(&self, key: String, request: ApiRequest) -> (PendingEntry, SharedResult) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let guard = PendingGuard {
            pending: self.pending.clone(),
            key,
            id,
        };
        let transport = self.transport.clone();
        let policy = self.policy;

        let shared = async move {
            let _guard = guard;
            execute_with_retry(transport, policy, request).await
        }
        .boxed()
        .shared();

        let handle = shared.downgrade();
        (PendingEntry { id, handle }, shared)
    }
}

/// Send `request`, retrying according to `policy`.
pub async fn execute_with_retry(
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    request: ApiRequest,
) -> Result<Value, RequestError> {
    let method = request.method().to_string();
    let mut attempt = 0;

    loop {
        match transport.send(&request).await {
            Ok(value) => {
                metrics::record_request(&method, "success");
                return Ok(value);
            }
            Err(err) => {
                if !policy.should_retry(&err, attempt) {
                    tracing::warn!(
                        method = %method,
                        url = %request.url(),
                        attempts = attempt + 1,
                        error = %err,
                        "Request failed"
                    );
                    metrics::record_request(&method, "failure");
                    return Err(err);
                }

                let delay = policy.delay_for(attempt);
                tracing::info!(
                    method = %method,
                    url = %request.url(),
                    attempt = attempt + 1,
                    delay = ?delay,
                    error = %err,
                    "Retrying request"
                );
                metrics::record_retry(&method);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
