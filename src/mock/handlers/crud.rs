//! Generic CRUD endpoints shared by every resource collection.

use axum::http::Method;
use serde_json::{json, Value};

use crate::mock::envelope::{ApiEnvelope, Page};
use crate::mock::handlers::{handler, Handler, MockRequest};
use crate::mock::store::{Collection, MockDb};
use crate::routing::RouteResolver;

/// Query keys that control listing rather than filter records.
const LIST_CONTROL_KEYS: [&str; 3] = ["page", "pageSize", "keyword"];

/// Fields never returned to clients.
const HIDDEN_FIELDS: [&str; 1] = ["password"];

/// Register the CRUD routes for `/resource`.
pub fn register(resolver: &mut RouteResolver<Handler>, resource: &'static str) {
    let base = format!("/{resource}");

    resolver.register(
        Method::GET,
        &base,
        handler(move |req, db| with_collection(db, resource, |c| list(c, req))),
    );
    resolver.register(
        Method::POST,
        &format!("{base}/batch-delete"),
        handler(move |req, db| with_collection(db, resource, |c| batch_delete(c, req))),
    );
    resolver.register(
        Method::GET,
        &format!("{base}/:id"),
        handler(move |req, db| with_collection(db, resource, |c| get(c, req))),
    );
    resolver.register(
        Method::POST,
        &base,
        handler(move |req, db| with_collection(db, resource, |c| create(c, req))),
    );
    resolver.register(
        Method::PUT,
        &format!("{base}/:id"),
        handler(move |req, db| with_collection(db, resource, |c| update(c, req))),
    );
    resolver.register(
        Method::DELETE,
        &format!("{base}/:id"),
        handler(move |req, db| with_collection(db, resource, |c| delete(c, req))),
    );
    resolver.register(
        Method::PATCH,
        &format!("{base}/:id/status"),
        handler(move |req, db| with_collection(db, resource, |c| update_status(c, req))),
    );
}

fn with_collection(
    db: &MockDb,
    resource: &str,
    f: impl FnOnce(&Collection) -> ApiEnvelope,
) -> ApiEnvelope {
    match db.collection(resource) {
        Some(collection) => f(collection),
        None => ApiEnvelope::error(500, format!("collection {resource} is not configured")),
    }
}

/// Copy of `record` without hidden fields.
pub fn public_view(mut record: Value) -> Value {
    if let Value::Object(map) = &mut record {
        for field in HIDDEN_FIELDS {
            map.remove(field);
        }
    }
    record
}

fn not_found(collection: &Collection) -> ApiEnvelope {
    ApiEnvelope::error(404, format!("{} not found", collection.name()))
}

fn field_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn matches_keyword(record: &Value, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    record.as_object().is_some_and(|map| {
        map.iter()
            .filter(|(key, _)| !HIDDEN_FIELDS.contains(&key.as_str()))
            .filter_map(|(_, value)| value.as_str())
            .any(|text| text.to_lowercase().contains(&keyword))
    })
}

fn matches_filters(record: &Value, req: &MockRequest) -> bool {
    req.query
        .iter()
        .filter(|(key, value)| !LIST_CONTROL_KEYS.contains(&key.as_str()) && !value.is_empty())
        .all(|(key, expected)| match record.get(key) {
            Some(actual) => field_as_string(actual).as_deref() == Some(expected.as_str()),
            // Unknown keys are not filters.
            None => true,
        })
}

fn list(collection: &Collection, req: &MockRequest) -> ApiEnvelope {
    let keyword = req.query.get("keyword").filter(|k| !k.is_empty());
    let records: Vec<Value> = collection
        .list()
        .into_iter()
        .filter(|record| keyword.map_or(true, |k| matches_keyword(record, k)))
        .filter(|record| matches_filters(record, req))
        .map(public_view)
        .collect();

    let page = Page::paginate(
        records,
        req.query_usize("page", 1),
        req.query_usize("pageSize", 10),
    );
    match serde_json::to_value(page) {
        Ok(data) => ApiEnvelope::ok(data),
        Err(e) => ApiEnvelope::error(500, e.to_string()),
    }
}

fn get(collection: &Collection, req: &MockRequest) -> ApiEnvelope {
    match req.id().and_then(|id| collection.get(id)) {
        Some(record) => ApiEnvelope::ok(public_view(record)),
        None => not_found(collection),
    }
}

fn create(collection: &Collection, req: &MockRequest) -> ApiEnvelope {
    let record = collection.create(req.body.clone());
    tracing::debug!(collection = collection.name(), id = %record["id"], "Created record");
    ApiEnvelope::ok(public_view(record))
}

fn update(collection: &Collection, req: &MockRequest) -> ApiEnvelope {
    match req.id().and_then(|id| collection.update(id, &req.body)) {
        Some(record) => ApiEnvelope::ok(public_view(record)),
        None => not_found(collection),
    }
}

fn delete(collection: &Collection, req: &MockRequest) -> ApiEnvelope {
    match req.id() {
        Some(id) if collection.delete(id) => ApiEnvelope::ok(Value::Null),
        _ => not_found(collection),
    }
}

fn batch_delete(collection: &Collection, req: &MockRequest) -> ApiEnvelope {
    let ids: Vec<u64> = req
        .body
        .get("ids")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_u64).collect())
        .unwrap_or_default();
    if ids.is_empty() {
        return ApiEnvelope::error(400, "ids must be a non-empty array");
    }
    let deleted = collection.delete_many(&ids);
    ApiEnvelope::ok(json!({ "deleted": deleted }))
}

fn update_status(collection: &Collection, req: &MockRequest) -> ApiEnvelope {
    let Some(status) = req.body.get("status").filter(|s| !s.is_null()) else {
        return ApiEnvelope::error(400, "status is required");
    };
    let patch = json!({ "status": status });
    match req.id().and_then(|id| collection.update(id, &patch)) {
        Some(record) => ApiEnvelope::ok(public_view(record)),
        None => not_found(collection),
    }
}
