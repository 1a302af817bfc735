//! REST API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use shared::{ApiStatus, ListQuery, RecordId};

use super::Backend;
use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};

/// Talks to the facility-services REST API
#[derive(Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RestBackend {
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Collection URL, always with the trailing slash the API expects
    fn collection_url(&self, path: &str) -> String {
        format!("{}/{}/", self.base_url, path.trim_matches('/'))
    }

    fn record_url(&self, path: &str, id: &RecordId) -> String {
        format!("{}/{}/{}/", self.base_url, path.trim_matches('/'), id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, url: &str) -> AppResult<Value> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(url, error = %e, "request failed");
            AppError::Transport(e)
        })?;
        read_body(response, url).await
    }
}

async fn read_body(response: Response, url: &str) -> AppResult<Value> {
    let status = response.status();
    let text = response.text().await?;
    let body = if text.trim().is_empty() {
        None
    } else {
        serde_json::from_str::<Value>(&text).ok()
    };

    if !status.is_success() {
        tracing::warn!(url, status = status.as_u16(), "server returned an error status");
        return Err(AppError::Status {
            status: status.as_u16(),
            body,
        });
    }

    // 204 and other empty successes
    let Some(body) = body else {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        return Err(AppError::InvalidResponse(format!("{url} returned non-JSON body")));
    };

    match ApiStatus::of(&body) {
        ApiStatus::Success => Ok(body),
        status => {
            tracing::warn!(url, ?status, "server rejected the request");
            Err(AppError::Rejected { status, body })
        }
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn list(&self, path: &str, query: &ListQuery) -> AppResult<Value> {
        let url = self.collection_url(path);
        tracing::debug!(url, page = query.page, "listing records");
        let builder = self.request(Method::GET, &url).query(&query.to_pairs());
        self.send(builder, &url).await
    }

    async fn fetch(&self, path: &str, id: &RecordId) -> AppResult<Value> {
        let url = self.record_url(path, id);
        tracing::debug!(url, "fetching record");
        self.send(self.request(Method::GET, &url), &url).await
    }

    async fn create(&self, path: &str, body: &Value) -> AppResult<Value> {
        let url = self.collection_url(path);
        tracing::debug!(url, "creating record");
        self.send(self.request(Method::POST, &url).json(body), &url).await
    }

    async fn update(&self, path: &str, id: &RecordId, body: &Value) -> AppResult<Value> {
        let url = self.record_url(path, id);
        tracing::debug!(url, "updating record");
        self.send(self.request(Method::PUT, &url).json(body), &url).await
    }

    async fn delete(&self, path: &str, id: &RecordId) -> AppResult<Value> {
        let url = self.record_url(path, id);
        tracing::debug!(url, "deleting record");
        self.send(self.request(Method::DELETE, &url), &url).await
    }
}
