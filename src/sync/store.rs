//! The remote document store boundary.
//!
//! The simulation only ever sees typed entities parsed from [`Document`]s;
//! raw store payloads stop here. Implementations: [`MemoryStore`] for
//! offline/demo/tests and `HttpStore` (native) for a real backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed document {id}: missing or invalid field `{field}`")]
    Malformed { id: String, field: &'static str },
}

/// A raw document as the store returns it: an id, a server-side update
/// stamp, and an unvalidated JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    /// Server-side modification time in milliseconds; drives the
    /// stale-fetch and idempotence guards.
    pub updated_at: u64,
    pub data: Value,
}

/// Abstract document store interface.
///
/// `Send + Sync` because fetches and writes run on short-lived worker
/// threads while the simulation keeps rendering.
pub trait RemoteStore: Send + Sync {
    fn get_document(&self, collection: &str, id: &str) -> Result<Document, StoreError>;

    fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError>;

    fn set_document(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError>;

    fn update_document(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError>;
}

/// In-memory store for offline play and tests. Writes stamp documents
/// with a monotonic clock so update ordering behaves like the real thing.
pub struct MemoryStore {
    collections: Mutex<HashMap<String, HashMap<String, Document>>>,
    clock: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            clock: AtomicU64::new(1_000),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Seed a document with an explicit update stamp. Used by the offline
    /// world builder and by tests that need precise ordering.
    pub fn insert(&self, collection: &str, id: &str, updated_at: u64, data: Value) {
        let mut collections = self.collections.lock().unwrap();
        collections.entry(collection.to_string()).or_default().insert(
            id.to_string(),
            Document {
                id: id.to_string(),
                updated_at,
                data,
            },
        );
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for MemoryStore {
    fn get_document(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        let collections = self.collections.lock().unwrap();
        collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.lock().unwrap();
        let mut matches: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| doc.data.get(field).and_then(Value::as_str) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matches)
    }

    fn set_document(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        let stamp = self.tick();
        self.insert(collection, id, stamp, data);
        Ok(())
    }

    fn update_document(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let stamp = self.tick();
        let mut collections = self.collections.lock().unwrap();
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        if let (Some(data), Some(patch)) = (doc.data.as_object_mut(), patch.as_object()) {
            for (key, value) in patch {
                data.insert(key.clone(), value.clone());
            }
        }
        doc.updated_at = stamp;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_returns_not_found_for_missing_documents() {
        let store = MemoryStore::new();
        let err = store.get_document("players", "nobody").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn writes_advance_the_update_stamp() {
        let store = MemoryStore::new();
        store
            .set_document("players", "p1", json!({"level": 1}))
            .unwrap();
        let first = store.get_document("players", "p1").unwrap().updated_at;

        store
            .update_document("players", "p1", json!({"level": 2}))
            .unwrap();
        let doc = store.get_document("players", "p1").unwrap();
        assert!(doc.updated_at > first);
        assert_eq!(doc.data["level"], 2);
    }

    #[test]
    fn update_merges_rather_than_replaces() {
        let store = MemoryStore::new();
        store
            .set_document("players", "p1", json!({"level": 1, "name": "Ada"}))
            .unwrap();
        store
            .update_document("players", "p1", json!({"level": 3}))
            .unwrap();

        let doc = store.get_document("players", "p1").unwrap();
        assert_eq!(doc.data["level"], 3);
        assert_eq!(doc.data["name"], "Ada");
    }

    #[test]
    fn query_filters_on_the_given_field() {
        let store = MemoryStore::new();
        store.insert("quests", "q1", 10, json!({"assignedTo": "ada", "status": "active"}));
        store.insert("quests", "q2", 11, json!({"assignedTo": "bob", "status": "active"}));
        store.insert("quests", "q3", 12, json!({"assignedTo": "ada", "status": "completed"}));

        let docs = store.query_by_field("quests", "assignedTo", "ada").unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q3"]);
    }
}
