//! Embedded key-value object store
//!
//! Stands in for the REST API on prototype pages. Records live in named
//! collections keyed by an auto-incrementing integer id, and the whole
//! store can be saved to and restored from a JSON snapshot.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record {id} not found in {collection}")]
    NotFound { collection: String, id: i64 },

    #[error("Records must be JSON objects")]
    NotAnObject,

    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot format error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Collection {
    next_id: i64,
    records: BTreeMap<i64, Value>,
}

impl Collection {
    fn allocate_id(&mut self) -> i64 {
        self.next_id = self.next_id.max(self.records.keys().next_back().copied().unwrap_or(0)) + 1;
        self.next_id
    }
}

/// Shared handle to the store. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, collection: &str, id: i64) -> Option<Value> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|c| c.records.get(&id))
            .cloned()
    }

    /// All records of a collection in id order
    pub async fn get_all(&self, collection: &str) -> Vec<Value> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .map(|c| c.records.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Insert a record under a fresh id and return it with `id` set
    pub async fn add(&self, collection: &str, record: Value) -> StoreResult<Value> {
        let Value::Object(mut fields) = record else {
            return Err(StoreError::NotAnObject);
        };
        let mut collections = self.collections.write().await;
        let entry = collections.entry(collection.to_string()).or_default();
        let id = entry.allocate_id();
        fields.insert("id".to_string(), Value::from(id));
        let stored = Value::Object(fields);
        entry.records.insert(id, stored.clone());
        tracing::debug!(collection, id, "local record added");
        Ok(stored)
    }

    /// Insert or replace the record with this id
    pub async fn put(&self, collection: &str, id: i64, record: Value) -> StoreResult<Value> {
        let Value::Object(mut fields) = record else {
            return Err(StoreError::NotAnObject);
        };
        fields.insert("id".to_string(), Value::from(id));
        let stored = Value::Object(fields);
        let mut collections = self.collections.write().await;
        let entry = collections.entry(collection.to_string()).or_default();
        entry.next_id = entry.next_id.max(id);
        entry.records.insert(id, stored.clone());
        tracing::debug!(collection, id, "local record stored");
        Ok(stored)
    }

    pub async fn delete(&self, collection: &str, id: i64) -> StoreResult<Value> {
        let mut collections = self.collections.write().await;
        collections
            .get_mut(collection)
            .and_then(|c| c.records.remove(&id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id,
            })
    }

    /// Serialize every collection
    pub async fn snapshot(&self) -> StoreResult<Value> {
        let collections = self.collections.read().await;
        Ok(serde_json::to_value(&*collections)?)
    }

    pub fn from_snapshot(snapshot: Value) -> StoreResult<Self> {
        let collections: HashMap<String, Collection> = serde_json::from_value(snapshot)?;
        Ok(Self {
            collections: Arc::new(RwLock::new(collections)),
        })
    }

    /// Load a snapshot file; a missing file gives an empty store
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        match tokio::fs::read(path.as_ref()).await {
            Ok(bytes) => Self::from_snapshot(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let snapshot = self.snapshot().await?;
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path.as_ref(), serde_json::to_vec_pretty(&snapshot)?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_assigns_increasing_ids() {
        let store = LocalStore::new();
        let first = store.add("vehicles", json!({"name": "Van 1"})).await.unwrap();
        let second = store.add("vehicles", json!({"name": "Van 2"})).await.unwrap();
        assert_eq!(first["id"], json!(1));
        assert_eq!(second["id"], json!(2));
        assert_eq!(store.get_all("vehicles").await.len(), 2);
        assert!(store.get_all("suppliers").await.is_empty());
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = LocalStore::new();
        store.add("vehicles", json!({"name": "Van 1"})).await.unwrap();
        store.add("vehicles", json!({"name": "Van 2"})).await.unwrap();
        store.delete("vehicles", 2).await.unwrap();
        let third = store.add("vehicles", json!({"name": "Van 3"})).await.unwrap();
        assert_eq!(third["id"], json!(3));
    }

    #[tokio::test]
    async fn test_put_and_delete() {
        let store = LocalStore::new();
        store.put("suppliers", 10, json!({"name": "Agro"})).await.unwrap();
        assert_eq!(store.get("suppliers", 10).await.unwrap()["name"], json!("Agro"));
        let next = store.add("suppliers", json!({"name": "Next"})).await.unwrap();
        assert_eq!(next["id"], json!(11));

        store.delete("suppliers", 10).await.unwrap();
        assert!(store.get("suppliers", 10).await.is_none());
        assert!(matches!(
            store.delete("suppliers", 10).await,
            Err(StoreError::NotFound { id: 10, .. })
        ));
    }

    #[tokio::test]
    async fn test_rejects_non_objects() {
        let store = LocalStore::new();
        assert!(matches!(
            store.add("vehicles", json!([1, 2])).await,
            Err(StoreError::NotAnObject)
        ));
    }

    #[tokio::test]
    async fn test_snapshot_restores_records_and_counter() {
        let store = LocalStore::new();
        store.add("vehicles", json!({"name": "Van 1"})).await.unwrap();
        let snapshot = store.snapshot().await.unwrap();

        let restored = LocalStore::from_snapshot(snapshot).unwrap();
        assert_eq!(restored.get("vehicles", 1).await.unwrap()["name"], json!("Van 1"));
        let next = restored.add("vehicles", json!({"name": "Van 2"})).await.unwrap();
        assert_eq!(next["id"], json!(2));
    }
}
