//! Cache-first and network-first handlers.
//!
//! Both always resolve to a response. Network failures are recovered through
//! each strategy's fallback chain; cache read failures count as misses.
//!
//! Writes into the runtime cache happen on detached tasks so the caller gets
//! its response without waiting on storage. Failed writes are logged and
//! metered, never retried.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use reqwest::Method;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::OfflineProxy;
use super::routing::Strategy;
use crate::Result;
use crate::cache::CacheStorage;
use crate::telemetry;
use crate::types::{ProxyRequest, ProxyResponse, RequestKey, ResponseSource};

/// Detached runtime-cache writes.
///
/// Tasks run on the runtime independently of the proxy: dropping the proxy
/// leaves pending writes running to completion.
#[derive(Default)]
pub(crate) struct BackgroundWrites {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl BackgroundWrites {
    /// Spawn onto the current runtime.
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.retain(|h| !h.is_finished());
        handles.push(tokio::spawn(task));
    }

    /// Wait for every write spawned so far.
    pub(crate) async fn settle(&self) {
        let pending = std::mem::take(
            &mut *self.handles.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for handle in pending {
            if let Err(e) = handle.await {
                debug!(error = %e, "runtime cache write task did not complete");
            }
        }
    }
}

impl OfflineProxy {
    /// Serve from cache when present; otherwise fetch, cache a 200, and fall
    /// back to the offline page or a synthetic offline HTML page.
    pub(crate) async fn cache_first(&self, request: &ProxyRequest) -> ProxyResponse {
        let strategy = Strategy::CacheFirst;
        let key = request.key();

        for generation in [&self.config.shell_cache, &self.config.runtime_cache] {
            if let Some(response) = self.lookup(generation, &key).await {
                record_lookup(strategy, true);
                record_request(strategy, "cache");
                return response;
            }
        }
        record_lookup(strategy, false);

        match self.fetch(strategy, request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.store_runtime(key, &response);
                }
                record_request(strategy, "network");
                response
            }
            Err(e) => {
                debug!(
                    url = %request.url,
                    error = %e,
                    "network unavailable, serving offline fallback"
                );
                match self.offline_page().await {
                    Some(page) => {
                        record_request(strategy, "offline_page");
                        page
                    }
                    None => {
                        record_request(strategy, "synthetic");
                        ProxyResponse::offline_html()
                    }
                }
            }
        }
    }

    /// Fetch first and cache a 200; when the network fails, serve a match
    /// from any generation or a synthetic 503.
    pub(crate) async fn network_first(&self, request: &ProxyRequest) -> ProxyResponse {
        let strategy = Strategy::NetworkFirst;
        let key = request.key();

        let error = match self.fetch(strategy, request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.store_runtime(key, &response);
                }
                record_request(strategy, "network");
                return response;
            }
            Err(e) => e,
        };
        debug!(url = %request.url, error = %error, "network unavailable, trying caches");

        match self.storage.match_any(&key).await {
            Ok(Some(hit)) => {
                record_lookup(strategy, true);
                record_request(strategy, "cache");
                hit.response
            }
            Ok(None) => {
                record_lookup(strategy, false);
                record_request(strategy, "synthetic");
                ProxyResponse::offline_api_error()
            }
            Err(e) => {
                warn!(key = %key, error = %e, "cache lookup failed");
                record_lookup(strategy, false);
                record_request(strategy, "synthetic");
                ProxyResponse::offline_api_error()
            }
        }
    }

    async fn fetch(&self, strategy: Strategy, request: &ProxyRequest) -> Result<ProxyResponse> {
        let start = Instant::now();
        let result = self.fetcher.fetch(request).await;
        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::histogram!(telemetry::FETCH_DURATION_SECONDS,
            "strategy" => strategy.as_str(),
            "status" => status,
        )
        .record(start.elapsed().as_secs_f64());
        result
    }

    /// Single-generation lookup; a storage error is a miss.
    async fn lookup(&self, generation: &str, key: &RequestKey) -> Option<ProxyResponse> {
        match self.storage.match_in(generation, key).await {
            Ok(found) => found,
            Err(e) => {
                warn!(generation, key = %key, error = %e, "cache lookup failed");
                None
            }
        }
    }

    /// The precached offline page, if the shell holds one.
    async fn offline_page(&self) -> Option<ProxyResponse> {
        let url = self.config.resolve(&self.config.offline_page).ok()?;
        let key = RequestKey::new(Method::GET, &url);
        self.lookup(&self.config.shell_cache, &key)
            .await
            .map(|page| page.with_source(ResponseSource::OfflinePage))
    }

    /// Store a copy in the runtime cache without holding up the caller.
    fn store_runtime(&self, key: RequestKey, response: &ProxyResponse) {
        let storage: Arc<dyn CacheStorage> = Arc::clone(&self.storage);
        let generation = self.config.runtime_cache.clone();
        let snapshot = response.clone();
        self.writes.spawn(async move {
            let label = key.to_string();
            match storage.put(&generation, key, snapshot).await {
                Ok(()) => {
                    metrics::counter!(telemetry::RUNTIME_WRITES_TOTAL, "status" => "ok")
                        .increment(1);
                }
                Err(e) => {
                    debug!(key = %label, error = %e, "runtime cache write failed");
                    metrics::counter!(telemetry::RUNTIME_WRITES_TOTAL, "status" => "error")
                        .increment(1);
                }
            }
        });
    }
}

fn record_request(strategy: Strategy, outcome: &'static str) {
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "strategy" => strategy.as_str(),
        "outcome" => outcome,
    )
    .increment(1);
}

fn record_lookup(strategy: Strategy, hit: bool) {
    let name = if hit {
        telemetry::CACHE_HITS_TOTAL
    } else {
        telemetry::CACHE_MISSES_TOTAL
    };
    metrics::counter!(name, "strategy" => strategy.as_str()).increment(1);
}
