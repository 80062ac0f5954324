//! Login and session endpoints.
//!
//! Tokens are opaque strings of the form `mock_token_{userId}_{timestamp}`.

use axum::http::Method;
use serde_json::{json, Value};

use crate::mock::envelope::ApiEnvelope;
use crate::mock::handlers::crud::public_view;
use crate::mock::handlers::{handler, Handler, MockRequest};
use crate::mock::store::MockDb;
use crate::routing::RouteResolver;

const TOKEN_PREFIX: &str = "mock_token";

pub fn register(resolver: &mut RouteResolver<Handler>) {
    resolver.register(Method::POST, "/auth/login", handler(login));
    resolver.register(Method::GET, "/auth/me", handler(me));
    resolver.register(Method::POST, "/auth/logout", handler(logout));
}

/// Issue a token for `user_id`.
pub fn issue_token(user_id: u64) -> String {
    format!(
        "{TOKEN_PREFIX}_{user_id}_{}",
        chrono::Utc::now().timestamp_millis()
    )
}

/// Extract the user id from a token: the third `_`-separated segment.
pub fn parse_token(token: &str) -> Option<u64> {
    if !token.starts_with(TOKEN_PREFIX) {
        return None;
    }
    token.split('_').nth(2)?.parse().ok()
}

fn login(req: &MockRequest, db: &MockDb) -> ApiEnvelope {
    let username = req.body.get("username").and_then(Value::as_str);
    let password = req.body.get("password").and_then(Value::as_str);
    let (Some(username), Some(password)) = (username, password) else {
        return ApiEnvelope::error(400, "username and password are required");
    };

    let Some(users) = db.collection("users") else {
        return ApiEnvelope::error(500, "collection users is not configured");
    };
    let user = users.find(|u| {
        u.get("username").and_then(Value::as_str) == Some(username)
            && u.get("password").and_then(Value::as_str) == Some(password)
    });

    match user {
        Some(user) if user.get("status").and_then(Value::as_str) == Some("disabled") => {
            ApiEnvelope::error(403, "account is disabled")
        }
        Some(user) => {
            let id = user.get("id").and_then(Value::as_u64).unwrap_or_default();
            tracing::info!(user_id = id, username, "Mock login");
            ApiEnvelope::ok(json!({
                "token": issue_token(id),
                "user": public_view(user),
            }))
        }
        None => ApiEnvelope::error(400, "invalid username or password"),
    }
}

fn me(req: &MockRequest, db: &MockDb) -> ApiEnvelope {
    let user = req
        .token
        .as_deref()
        .and_then(parse_token)
        .and_then(|id| db.collection("users")?.get(id));

    match user {
        Some(user) => ApiEnvelope::ok(public_view(user)),
        None => ApiEnvelope::error(401, "not logged in"),
    }
}

fn logout(_req: &MockRequest, _db: &MockDb) -> ApiEnvelope {
    ApiEnvelope::ok(Value::Null)
}
