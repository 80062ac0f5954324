//! In-memory record collections backing the mock API.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde_json::{Map, Value};

/// Collections served by the generic CRUD routes.
pub const RESOURCES: [&str; 10] = [
    "users",
    "products",
    "orders",
    "categories",
    "tags",
    "warehouses",
    "stock",
    "roles",
    "organizations",
    "menus",
];

/// Fields a client may never overwrite through `update`.
const PROTECTED_FIELDS: [&str; 2] = ["id", "createdAt"];

fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Read the numeric `id` of a record.
pub fn record_id(record: &Value) -> Option<u64> {
    record.get("id").and_then(Value::as_u64)
}

/// An id-keyed set of JSON object records.
#[derive(Debug)]
pub struct Collection {
    name: String,
    records: DashMap<u64, Value>,
    next_id: AtomicU64,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records ordered by id.
    pub fn list(&self) -> Vec<Value> {
        let mut records: Vec<(u64, Value)> = self
            .records
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect();
        records.sort_by_key(|(id, _)| *id);
        records.into_iter().map(|(_, v)| v).collect()
    }

    pub fn get(&self, id: u64) -> Option<Value> {
        self.records.get(&id).map(|r| r.value().clone())
    }

    /// First record (by id) satisfying `predicate`.
    pub fn find(&self, predicate: impl Fn(&Value) -> bool) -> Option<Value> {
        self.list().into_iter().find(|record| predicate(record))
    }

    /// Insert a record, assigning a fresh id and timestamps.
    /// Non-object input is stored as an empty object.
    pub fn create(&self, fields: Value) -> Value {
        let mut object = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let timestamp = now();
        object.insert("id".into(), Value::from(id));
        object.insert("createdAt".into(), Value::from(timestamp.clone()));
        object.insert("updatedAt".into(), Value::from(timestamp));

        let record = Value::Object(object);
        self.records.insert(id, record.clone());
        record
    }

    /// Insert a fixture keeping its own `id` when it has one.
    pub fn insert_fixture(&self, fixture: Value) -> Value {
        let Some(id) = record_id(&fixture) else {
            return self.create(fixture);
        };
        let mut object = match fixture {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let timestamp = now();
        object
            .entry("createdAt")
            .or_insert_with(|| Value::from(timestamp.clone()));
        object
            .entry("updatedAt")
            .or_insert_with(|| Value::from(timestamp));

        let record = Value::Object(object);
        self.records.insert(id, record.clone());
        self.next_id.fetch_max(id + 1, Ordering::Relaxed);
        record
    }

    /// Merge `patch` into record `id`. Returns the updated record.
    pub fn update(&self, id: u64, patch: &Value) -> Option<Value> {
        let mut entry = self.records.get_mut(&id)?;
        if let (Value::Object(record), Value::Object(patch)) = (entry.value_mut(), patch) {
            for (key, value) in patch {
                if !PROTECTED_FIELDS.contains(&key.as_str()) {
                    record.insert(key.clone(), value.clone());
                }
            }
            record.insert("updatedAt".into(), Value::from(now()));
        }
        Some(entry.value().clone())
    }

    pub fn delete(&self, id: u64) -> bool {
        self.records.remove(&id).is_some()
    }

    /// Delete every listed id, returning how many existed.
    pub fn delete_many(&self, ids: &[u64]) -> usize {
        ids.iter().filter(|id| self.delete(**id)).count()
    }
}

/// The set of collections a mock API instance works against.
///
/// Each instance is independent, so tests can run against isolated fixtures.
#[derive(Debug)]
pub struct MockDb {
    collections: HashMap<&'static str, Collection>,
}

impl Default for MockDb {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDb {
    /// Empty collections for every resource.
    pub fn new() -> Self {
        let collections = RESOURCES
            .iter()
            .map(|name| (*name, Collection::new(*name)))
            .collect();
        Self { collections }
    }

    /// Collections populated with fixture data.
    pub fn seeded() -> Self {
        let db = Self::new();
        crate::mock::seed::seed(&db);
        db
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Collection for one of [`RESOURCES`].
    ///
    /// # Panics
    /// Panics if `name` is not a known resource.
    pub fn resource(&self, name: &str) -> &Collection {
        self.collections
            .get(name)
            .unwrap_or_else(|| panic!("unknown mock resource '{name}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_crud() {
        let tags = Collection::new("tags");
        let a = tags.create(json!({ "name": "new" }));
        let b = tags.create(json!({ "name": "hot" }));
        assert_eq!(record_id(&a), Some(1));
        assert_eq!(record_id(&b), Some(2));
        assert!(a.get("createdAt").is_some());

        let updated = tags.update(1, &json!({ "name": "fresh", "id": 99 })).unwrap();
        assert_eq!(updated["name"], "fresh");
        assert_eq!(updated["id"], 1);

        assert!(tags.delete(2));
        assert!(!tags.delete(2));
        assert_eq!(tags.len(), 1);
        assert!(tags.update(2, &json!({})).is_none());
    }

    #[test]
    fn test_list_is_ordered_by_id() {
        let items = Collection::new("items");
        for i in 0..20 {
            items.create(json!({ "n": i }));
        }
        let ids: Vec<u64> = items.list().iter().filter_map(record_id).collect();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_fixture_ids_advance_counter() {
        let menus = Collection::new("menus");
        menus.insert_fixture(json!({ "id": 7, "name": "Dashboard" }));
        let created = menus.create(json!({ "name": "Users" }));
        assert_eq!(record_id(&created), Some(8));
    }

    #[test]
    fn test_delete_many_counts_existing() {
        let stock = Collection::new("stock");
        stock.create(json!({}));
        stock.create(json!({}));
        assert_eq!(stock.delete_many(&[1, 2, 3]), 2);
        assert!(stock.is_empty());
    }

    #[test]
    fn test_databases_are_isolated() {
        let a = MockDb::new();
        let b = MockDb::new();
        a.resource("users").create(json!({ "username": "x" }));
        assert_eq!(a.resource("users").len(), 1);
        assert!(b.resource("users").is_empty());
        assert!(a.collection("nope").is_none());
    }
}
