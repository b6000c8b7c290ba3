//! The network fetch primitive.
//!
//! [`Fetcher`] is the proxy's only way to reach the network. An `Err` means
//! the network itself failed (connection refused, DNS, truncated body); an
//! HTTP error status is still `Ok` and is passed through to the caller.

mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;

use crate::Result;
use crate::types::{ProxyRequest, ProxyResponse};

/// Performs a real network retrieval for a request.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetcher name for logging/debugging.
    fn name(&self) -> &str;

    /// Fetch the request and read the full response body.
    async fn fetch(&self, request: &ProxyRequest) -> Result<ProxyResponse>;
}
