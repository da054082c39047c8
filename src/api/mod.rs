pub mod cache;
pub mod client;
pub mod envelope;
pub mod request;

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Method;
use serde_json::Value;

use crate::config::Config;
use crate::error::ClientResult;

pub use cache::LookupCache;
pub use client::HttpResourceClient;
pub use envelope::{ApiResponse, PageData, accepted, pages_for, parse_page};
pub use request::{ApiRequest, FilePart, MultipartForm, RequestBody, path_of};

/// Seam between the controllers and the wire. The HTTP client implements it for real
/// traffic; tests plug in an in-memory backend.
pub trait Transport: Send + Sync {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, ClientResult<Value>>;

    fn base_url(&self) -> &str;
}

/// Shared handle every controller and service talks through.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    cache: LookupCache,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self {
            transport,
            cache: LookupCache::new(config.lookup_cache_capacity, config.lookup_cache_ttl_secs),
        }
    }

    pub fn http(config: &Config) -> ClientResult<Self> {
        let transport = HttpResourceClient::new(config)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    pub async fn send(&self, request: ApiRequest) -> ClientResult<Value> {
        let mutating = !request.is_read();
        let result = self.transport.send(request).await;

        if mutating && result.is_ok() {
            self.cache.invalidate_all();
        }

        result
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> ClientResult<Value> {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        self.send(request).await
    }

    /// Cached GET for lookup data. Only successful responses are stored.
    pub async fn lookup(&self, request: ApiRequest) -> ClientResult<Value> {
        let key = request.target();
        if let Some(hit) = self.cache.get(&key).await {
            log::debug!("Lookup cache hit for {}", key);
            return Ok(hit);
        }

        let value = self.send(request).await?;
        self.cache.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Absolute URL for a backend path, for links opened outside the client.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.transport.base_url().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }
}
