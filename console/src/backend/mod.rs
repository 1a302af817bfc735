//! Persistence seam
//!
//! Page controllers only see [`Backend`]. Responses are raw JSON in the
//! REST API's envelopes; the shared normalizer and hydrator make sense of them.

mod local;
mod rest;

pub use local::LocalBackend;
pub use rest::RestBackend;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use shared::{ListQuery, RecordId};

use crate::config::{Config, StorageMode};
use crate::error::AppResult;
use crate::store::LocalStore;

#[async_trait]
pub trait Backend: Send + Sync {
    /// One page of a collection
    async fn list(&self, path: &str, query: &ListQuery) -> AppResult<Value>;

    async fn fetch(&self, path: &str, id: &RecordId) -> AppResult<Value>;

    async fn create(&self, path: &str, body: &Value) -> AppResult<Value>;

    async fn update(&self, path: &str, id: &RecordId, body: &Value) -> AppResult<Value>;

    async fn delete(&self, path: &str, id: &RecordId) -> AppResult<Value>;
}

/// Build the backend selected by `storage.mode`
pub async fn connect(config: &Config) -> AppResult<Arc<dyn Backend>> {
    match config.storage.mode {
        StorageMode::Remote => {
            tracing::info!(base_url = %config.api.base_url, "using REST backend");
            Ok(Arc::new(RestBackend::new(&config.api)?))
        }
        StorageMode::Local => {
            let store = match &config.storage.snapshot_path {
                Some(path) => LocalStore::open(path).await?,
                None => LocalStore::new(),
            };
            tracing::info!(snapshot = ?config.storage.snapshot_path, "using local store backend");
            let backend = LocalBackend::new(store);
            Ok(Arc::new(match &config.storage.snapshot_path {
                Some(path) => backend.with_snapshot(path),
                None => backend,
            }))
        }
    }
}
