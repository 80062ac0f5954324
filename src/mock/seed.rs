//! Deterministic fixture data.

use serde_json::json;

use crate::mock::store::MockDb;

const USER_NAMES: [(&str, &str); 10] = [
    ("admin", "Administrator"),
    ("editor", "Content Editor"),
    ("zhangsan", "Zhang San"),
    ("lisi", "Li Si"),
    ("wangwu", "Wang Wu"),
    ("zhaoliu", "Zhao Liu"),
    ("sunqi", "Sun Qi"),
    ("zhouba", "Zhou Ba"),
    ("wujiu", "Wu Jiu"),
    ("zhengshi", "Zheng Shi"),
];

const CATEGORIES: [&str; 5] = ["Electronics", "Clothing", "Home", "Books", "Sports"];

const PRODUCTS: [(&str, u64, f64); 12] = [
    ("Wireless Mouse", 1, 59.0),
    ("Mechanical Keyboard", 1, 399.0),
    ("USB-C Hub", 1, 129.0),
    ("Cotton T-Shirt", 2, 79.0),
    ("Denim Jacket", 2, 299.0),
    ("Desk Lamp", 3, 149.0),
    ("Ceramic Mug", 3, 39.0),
    ("Rust in Action", 4, 89.0),
    ("Design Patterns", 4, 119.0),
    ("Yoga Mat", 5, 99.0),
    ("Running Shoes", 5, 459.0),
    ("Water Bottle", 5, 49.0),
];

const ORDER_STATUSES: [&str; 4] = ["pending", "paid", "shipped", "completed"];

/// Populate every collection of `db`.
pub fn seed(db: &MockDb) {
    let users = db.resource("users");
    for (i, (username, nickname)) in USER_NAMES.iter().enumerate() {
        let id = i as u64 + 1;
        users.insert_fixture(json!({
            "id": id,
            "username": username,
            "password": "123456",
            "nickname": nickname,
            "email": format!("{username}@example.com"),
            "roleId": if id == 1 { 1 } else if id == 2 { 2 } else { 3 },
            "organizationId": (id % 3) + 1,
            "status": if id % 4 == 0 { "disabled" } else { "active" },
        }));
    }

    let categories = db.resource("categories");
    for (i, name) in CATEGORIES.iter().enumerate() {
        categories.insert_fixture(json!({
            "id": i as u64 + 1,
            "name": name,
            "parentId": null,
            "sort": i + 1,
            "status": "active",
        }));
    }

    let products = db.resource("products");
    let stock = db.resource("stock");
    for (i, (name, category_id, price)) in PRODUCTS.iter().enumerate() {
        let id = i as u64 + 1;
        products.insert_fixture(json!({
            "id": id,
            "name": name,
            "sku": format!("SKU-{:04}", id),
            "categoryId": category_id,
            "price": price,
            "sales": (id * 37) % 200,
            "status": if id % 5 == 0 { "offline" } else { "online" },
        }));
        stock.insert_fixture(json!({
            "id": id,
            "productId": id,
            "warehouseId": (id % 3) + 1,
            "quantity": (id * 13) % 150,
            "threshold": 20,
            "status": "active",
        }));
    }

    let orders = db.resource("orders");
    for i in 0..15u64 {
        let id = i + 1;
        let product_index = (i % PRODUCTS.len() as u64) as usize;
        let quantity = (i % 3) + 1;
        let (_, _, price) = PRODUCTS[product_index];
        orders.insert_fixture(json!({
            "id": id,
            "orderNo": format!("ORD{:08}", 20240100 + id),
            "userId": (i % 10) + 1,
            "productId": product_index + 1,
            "quantity": quantity,
            "amount": price * quantity as f64,
            "status": ORDER_STATUSES[(i % 4) as usize],
            "createdAt": format!("2024-01-{:02}T10:00:00Z", (i % 7) + 1),
        }));
    }

    let tags = db.resource("tags");
    for (i, name) in ["new", "hot", "sale", "limited", "gift"].iter().enumerate() {
        tags.insert_fixture(json!({ "id": i as u64 + 1, "name": name, "status": "active" }));
    }

    let warehouses = db.resource("warehouses");
    for (i, (name, city)) in [("North Hub", "Beijing"), ("East Hub", "Shanghai"), ("South Hub", "Shenzhen")]
        .iter()
        .enumerate()
    {
        warehouses.insert_fixture(json!({
            "id": i as u64 + 1,
            "name": name,
            "city": city,
            "status": "active",
        }));
    }

    let roles = db.resource("roles");
    for (i, (code, name)) in [("admin", "Administrator"), ("editor", "Editor"), ("viewer", "Viewer")]
        .iter()
        .enumerate()
    {
        roles.insert_fixture(json!({
            "id": i as u64 + 1,
            "code": code,
            "name": name,
            "status": "active",
        }));
    }

    let organizations = db.resource("organizations");
    for (i, name) in ["Headquarters", "Sales", "Engineering"].iter().enumerate() {
        organizations.insert_fixture(json!({
            "id": i as u64 + 1,
            "name": name,
            "parentId": if i == 0 { json!(null) } else { json!(1) },
            "status": "active",
        }));
    }

    let menus = db.resource("menus");
    for (i, (title, path)) in [
        ("Dashboard", "/dashboard"),
        ("Users", "/system/users"),
        ("Products", "/catalog/products"),
        ("Orders", "/sales/orders"),
        ("Inventory", "/inventory/stock"),
        ("Analytics", "/analytics"),
    ]
    .iter()
    .enumerate()
    {
        menus.insert_fixture(json!({
            "id": i as u64 + 1,
            "title": title,
            "path": path,
            "sort": i + 1,
            "status": "active",
        }));
    }

    tracing::debug!(users = users.len(), products = products.len(), orders = orders.len(), "Seeded mock data");
}
