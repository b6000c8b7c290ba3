//! reqwest-backed fetcher

use async_trait::async_trait;
use tracing::debug;

use super::Fetcher;
use crate::Result;
use crate::types::{ProxyRequest, ProxyResponse, ResponseSource};

/// [`Fetcher`] over a shared `reqwest::Client`.
///
/// Forwards method, headers and body unchanged. No timeout is applied: a
/// stuck request only blocks the task awaiting it.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher reusing an existing client (connection pool, TLS
    /// config).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, request: &ProxyRequest) -> Result<ProxyResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        debug!(url = %request.url, %status, bytes = body.len(), "fetched");

        Ok(ProxyResponse {
            status,
            headers,
            body,
            source: ResponseSource::Network,
        })
    }
}
