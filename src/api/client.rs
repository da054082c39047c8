use futures::future::BoxFuture;
use reqwest::Method;
use serde_json::{Value, json};
use uuid::Uuid;

use super::Transport;
use super::request::{ApiRequest, RequestBody};
use crate::config::Config;
use crate::error::{ClientError, ClientResult};

pub const CORRELATION_HEADER: &str = "X-Correlation-ID";

/// Single-attempt JSON client for the admin backend. No retries and no timeout.
#[derive(Clone)]
pub struct HttpResourceClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpResourceClient {
    pub fn new(config: &Config) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> ClientResult<Value> {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        self.execute(request).await
    }

    pub async fn execute(&self, request: ApiRequest) -> ClientResult<Value> {
        let correlation_id = Uuid::new_v4().to_string();
        let url = format!(
            "{}/{}",
            self.base_url,
            request.path.trim_start_matches('/')
        );

        log::debug!(
            "{} {} correlation_id={}",
            request.method,
            request.target(),
            correlation_id
        );

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header(CORRELATION_HEADER, &correlation_id);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match request.body {
            Some(RequestBody::Json(body)) => builder.json(&body),
            Some(RequestBody::Multipart(form)) => builder.multipart(form.into_reqwest()?),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        // Status-only endpoints still resolve
        let body = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({}));

        if status.is_success() {
            Ok(body)
        } else {
            let error = ClientError::from_status(status.as_u16(), &body);
            log::warn!(
                "{} {} failed with status {}: {} correlation_id={}",
                request.method,
                request.path,
                status,
                error,
                correlation_id
            );
            Err(error)
        }
    }
}

impl Transport for HttpResourceClient {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, ClientResult<Value>> {
        Box::pin(self.execute(request))
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
