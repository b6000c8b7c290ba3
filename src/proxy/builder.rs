//! Builder for configuring proxy instances

use std::sync::Arc;

use tracing::warn;

use super::{HostControl, LocalHost, OfflineProxy, ProxyConfig};
use crate::Result;
use crate::cache::{CacheStorage, MemoryCacheStorage};
use crate::fetch::{Fetcher, HttpFetcher};

/// Builder for configuring proxy instances.
///
/// Every collaborator has an in-process default: [`MemoryCacheStorage`],
/// [`HttpFetcher`] and [`LocalHost`].
#[derive(Default)]
pub struct OfflineProxyBuilder {
    config: ProxyConfig,
    storage: Option<Arc<dyn CacheStorage>>,
    fetcher: Option<Arc<dyn Fetcher>>,
    host: Option<Arc<dyn HostControl>>,
    http_client: Option<reqwest::Client>,
}

impl OfflineProxyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ProxyConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the origin relative precache paths resolve against.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.config = self.config.origin(origin);
        self
    }

    /// Bump both cache names to a new version.
    pub fn version(mut self, version: &str) -> Self {
        self.config = self.config.version(version);
        self
    }

    /// Use custom cache storage.
    pub fn storage(mut self, storage: Arc<dyn CacheStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Use a custom fetcher instead of [`HttpFetcher`].
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Reuse an existing HTTP client for the default fetcher.
    ///
    /// Ignored when a custom fetcher is set.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Use custom activation-handoff control.
    pub fn host(mut self, host: Arc<dyn HostControl>) -> Self {
        self.host = Some(host);
        self
    }

    /// Validate the configuration and build the proxy.
    pub fn build(self) -> Result<OfflineProxy> {
        self.config.validate()?;
        if !self.config.offline_page_is_precached() {
            warn!(
                page = %self.config.offline_page,
                "offline page is not precached; offline static requests will get the built-in page"
            );
        }

        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryCacheStorage::new()));
        let fetcher = self.fetcher.unwrap_or_else(|| {
            let http = match self.http_client {
                Some(client) => HttpFetcher::with_client(client),
                None => HttpFetcher::new(),
            };
            Arc::new(http)
        });
        let host = self.host.unwrap_or_else(|| Arc::new(LocalHost::new()));

        Ok(OfflineProxy::new(self.config, storage, fetcher, host))
    }
}
