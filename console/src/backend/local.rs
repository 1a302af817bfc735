//! Backend over the embedded key-value store

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{json, Value};
use shared::fields::{lookup, text_of};
use shared::{ListQuery, RecordId};

use super::Backend;
use crate::error::{AppError, AppResult};
use crate::store::LocalStore;

/// Serves the REST envelopes from a [`LocalStore`] so page controllers
/// behave the same against either backend.
#[derive(Clone, Default)]
pub struct LocalBackend {
    store: LocalStore,
    snapshot_path: Option<PathBuf>,
}

impl LocalBackend {
    pub fn new(store: LocalStore) -> Self {
        Self {
            store,
            snapshot_path: None,
        }
    }

    /// Save a snapshot to `path` after every write
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    async fn persist(&self) -> AppResult<()> {
        if let Some(path) = &self.snapshot_path {
            self.store.save(path).await?;
        }
        Ok(())
    }
}

fn local_id(path: &str, id: &RecordId) -> AppResult<i64> {
    match id {
        RecordId::Int(i) => Ok(*i),
        RecordId::Text(_) => Err(AppError::NotFound(format!("{path}/{id}"))),
    }
}

fn matches_search(record: &Value, needle: &str) -> bool {
    match record {
        Value::Object(fields) => fields.values().any(|v| matches_search(v, needle)),
        Value::Array(items) => items.iter().any(|v| matches_search(v, needle)),
        Value::String(_) | Value::Number(_) => text_of(record)
            .map(|t| t.to_lowercase().contains(needle))
            .unwrap_or(false),
        _ => false,
    }
}

fn matches_filters(record: &Value, query: &ListQuery) -> bool {
    query
        .filters
        .iter()
        .filter(|(_, expected)| !expected.is_empty())
        .all(|(key, expected)| {
            lookup(record, key)
                .and_then(text_of)
                .map(|actual| actual.eq_ignore_ascii_case(expected))
                .unwrap_or(false)
        })
}

fn success(data: Value) -> Value {
    json!({ "status": "success", "data": data })
}

#[async_trait]
impl Backend for LocalBackend {
    async fn list(&self, path: &str, query: &ListQuery) -> AppResult<Value> {
        let needle = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let matching: Vec<Value> = self
            .store
            .get_all(path)
            .await
            .into_iter()
            .filter(|r| needle.as_deref().map_or(true, |n| matches_search(r, n)))
            .filter(|r| matches_filters(r, query))
            .collect();

        let count = matching.len();
        let page_size = query.page_size.max(1) as usize;
        let skip = (query.page.max(1) as usize - 1) * page_size;
        let results: Vec<Value> = matching.into_iter().skip(skip).take(page_size).collect();
        tracing::debug!(path, count, page = query.page, "local list");

        Ok(json!({ "data": { "results": results, "count": count } }))
    }

    async fn fetch(&self, path: &str, id: &RecordId) -> AppResult<Value> {
        let key = local_id(path, id)?;
        self.store
            .get(path, key)
            .await
            .map(success)
            .ok_or_else(|| AppError::NotFound(format!("{path}/{id}")))
    }

    async fn create(&self, path: &str, body: &Value) -> AppResult<Value> {
        let stored = self.store.add(path, body.clone()).await?;
        self.persist().await?;
        Ok(success(stored))
    }

    async fn update(&self, path: &str, id: &RecordId, body: &Value) -> AppResult<Value> {
        let key = local_id(path, id)?;
        if self.store.get(path, key).await.is_none() {
            return Err(AppError::NotFound(format!("{path}/{id}")));
        }
        let stored = self.store.put(path, key, body.clone()).await?;
        self.persist().await?;
        Ok(success(stored))
    }

    async fn delete(&self, path: &str, id: &RecordId) -> AppResult<Value> {
        let key = local_id(path, id)?;
        self.store.delete(path, key).await?;
        self.persist().await?;
        Ok(json!({ "status": "success" }))
    }
}
