//! HTTP client for the song, playlist and artist services.

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{header, StatusCode};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use super::path::ResourcePath;
use super::DownstreamService;
use crate::server::metrics::record_downstream_request;

/// Status, content type and raw body bytes of a downstream reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl DownstreamResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }
}

/// Failures that prevented getting a reply from a downstream service at all.
///
/// A reply with an error status is not a `DownstreamError`, it is returned
/// as a regular [`DownstreamResponse`].
#[derive(Debug, Error)]
pub enum DownstreamError {
    #[error("{service} request {method} {url} failed: {message}")]
    Transport {
        service: DownstreamService,
        method: &'static str,
        url: String,
        message: String,
    },

    #[error("{service} sent an unreadable response to {method} {url}: {message}")]
    MalformedResponse {
        service: DownstreamService,
        method: &'static str,
        url: String,
        message: String,
    },
}

impl DownstreamError {
    pub fn service(&self) -> DownstreamService {
        match self {
            DownstreamError::Transport { service, .. } => *service,
            DownstreamError::MalformedResponse { service, .. } => *service,
        }
    }
}

/// A single downstream service, addressed by paths below its base URL.
#[async_trait]
pub trait DownstreamClient: Send + Sync {
    /// Which service this client talks to.
    fn service(&self) -> DownstreamService;

    async fn get(&self, path: &ResourcePath) -> Result<DownstreamResponse, DownstreamError>;

    /// Issues a POST with an empty body.
    async fn post(&self, path: &ResourcePath) -> Result<DownstreamResponse, DownstreamError>;

    async fn delete(&self, path: &ResourcePath) -> Result<DownstreamResponse, DownstreamError>;
}

/// reqwest-backed [`DownstreamClient`].
pub struct HttpDownstreamClient {
    service: DownstreamService,
    client: reqwest::Client,
    base_url: String,
}

impl HttpDownstreamClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `service` - The service behind `base_url`
    /// * `base_url` - Base URL of the service (e.g., "http://localhost:8081")
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(service: DownstreamService, base_url: String, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .with_context(|| format!("Failed to create HTTP client for {}", service))?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            service,
            client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &ResourcePath,
    ) -> Result<DownstreamResponse, DownstreamError> {
        let method_label = method_label(&method);
        let url = path.to_url(&self.base_url);
        debug!(">>> {} {} {}", self.service, method_label, url);

        let start = Instant::now();
        let response = match self.client.request(method, &url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("{} {} {} failed: {}", self.service, method_label, url, err);
                record_downstream_request(
                    self.service,
                    method_label,
                    "transport_error",
                    start.elapsed(),
                );
                return Err(DownstreamError::Transport {
                    service: self.service,
                    method: method_label,
                    url,
                    message: err.to_string(),
                });
            }
        };

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                warn!(
                    "{} {} {} returned {} with unreadable body: {}",
                    self.service, method_label, url, status, err
                );
                record_downstream_request(
                    self.service,
                    method_label,
                    "malformed_response",
                    start.elapsed(),
                );
                return Err(DownstreamError::MalformedResponse {
                    service: self.service,
                    method: method_label,
                    url,
                    message: err.to_string(),
                });
            }
        };

        debug!(
            "<<< {} {} ({}ms)",
            self.service,
            status,
            start.elapsed().as_millis()
        );
        record_downstream_request(self.service, method_label, status.as_str(), start.elapsed());

        Ok(DownstreamResponse {
            status,
            content_type,
            body,
        })
    }
}

fn method_label(method: &reqwest::Method) -> &'static str {
    match *method {
        reqwest::Method::GET => "GET",
        reqwest::Method::POST => "POST",
        reqwest::Method::DELETE => "DELETE",
        _ => "OTHER",
    }
}

#[async_trait]
impl DownstreamClient for HttpDownstreamClient {
    fn service(&self) -> DownstreamService {
        self.service
    }

    async fn get(&self, path: &ResourcePath) -> Result<DownstreamResponse, DownstreamError> {
        self.send(reqwest::Method::GET, path).await
    }

    async fn post(&self, path: &ResourcePath) -> Result<DownstreamResponse, DownstreamError> {
        self.send(reqwest::Method::POST, path).await
    }

    async fn delete(&self, path: &ResourcePath) -> Result<DownstreamResponse, DownstreamError> {
        self.send(reqwest::Method::DELETE, path).await
    }
}
