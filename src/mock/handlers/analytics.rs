//! Read-only analytics derived from the store.

use std::collections::BTreeMap;

use axum::http::Method;
use serde_json::{json, Value};

use crate::mock::envelope::ApiEnvelope;
use crate::mock::handlers::{handler, Handler, MockRequest};
use crate::mock::store::MockDb;
use crate::routing::RouteResolver;

const TOP_PRODUCTS: usize = 5;

pub fn register(resolver: &mut RouteResolver<Handler>) {
    resolver.register(Method::GET, "/analytics/overview", handler(overview));
    resolver.register(Method::GET, "/analytics/sales-trend", handler(sales_trend));
    resolver.register(
        Method::GET,
        "/analytics/category-distribution",
        handler(category_distribution),
    );
    resolver.register(Method::GET, "/analytics/top-products", handler(top_products));
}

fn records(db: &MockDb, name: &str) -> Vec<Value> {
    db.collection(name).map(|c| c.list()).unwrap_or_default()
}

fn amount(order: &Value) -> f64 {
    order.get("amount").and_then(Value::as_f64).unwrap_or(0.0)
}

fn overview(_req: &MockRequest, db: &MockDb) -> ApiEnvelope {
    let orders = records(db, "orders");
    let revenue: f64 = orders.iter().map(amount).sum();
    let low_stock = records(db, "stock")
        .iter()
        .filter(|row| {
            let quantity = row.get("quantity").and_then(Value::as_u64).unwrap_or(0);
            let threshold = row.get("threshold").and_then(Value::as_u64).unwrap_or(0);
            quantity < threshold
        })
        .count();

    ApiEnvelope::ok(json!({
        "totalUsers": records(db, "users").len(),
        "totalProducts": records(db, "products").len(),
        "totalOrders": orders.len(),
        "totalRevenue": revenue,
        "lowStock": low_stock,
    }))
}

fn sales_trend(_req: &MockRequest, db: &MockDb) -> ApiEnvelope {
    let mut by_date: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for order in records(db, "orders") {
        let date = order
            .get("createdAt")
            .and_then(Value::as_str)
            .and_then(|ts| ts.get(..10))
            .unwrap_or("unknown")
            .to_string();
        let entry = by_date.entry(date).or_default();
        entry.0 += amount(&order);
        entry.1 += 1;
    }

    let points: Vec<Value> = by_date
        .into_iter()
        .map(|(date, (amount, orders))| json!({ "date": date, "amount": amount, "orders": orders }))
        .collect();
    ApiEnvelope::ok(Value::Array(points))
}

fn category_distribution(_req: &MockRequest, db: &MockDb) -> ApiEnvelope {
    let products = records(db, "products");
    let distribution: Vec<Value> = records(db, "categories")
        .iter()
        .map(|category| {
            let id = category.get("id").and_then(Value::as_u64);
            let count = products
                .iter()
                .filter(|p| p.get("categoryId").and_then(Value::as_u64) == id)
                .count();
            json!({ "name": category["name"], "value": count })
        })
        .collect();
    ApiEnvelope::ok(Value::Array(distribution))
}

fn top_products(req: &MockRequest, db: &MockDb) -> ApiEnvelope {
    let limit = req.query_usize("limit", TOP_PRODUCTS);
    let mut products = records(db, "products");
    products.sort_by_key(|p| std::cmp::Reverse(p.get("sales").and_then(Value::as_u64).unwrap_or(0)));

    let top: Vec<Value> = products
        .into_iter()
        .take(limit)
        .map(|p| json!({ "id": p["id"], "name": p["name"], "sales": p["sales"] }))
        .collect();
    ApiEnvelope::ok(Value::Array(top))
}
