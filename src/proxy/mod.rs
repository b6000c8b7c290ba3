//! The offline proxy.
//!
//! [`OfflineProxy`] sits between the application's outgoing requests and the
//! network. Every host event goes through [`OfflineProxy::handle`]:
//!
//! ```text
//!   Install ──► precache shell ──► skip waiting
//!   Activate ─► delete stale generations ──► claim clients
//!   Fetch ────► RequestRouter ──┬─► passthrough (non-GET, non-http(s))
//!                               ├─► cache-first   (static assets)
//!                               └─► network-first (/analyze, /health, /highlight_pdf)
//!   Message ──► SKIP_WAITING ──► skip waiting; anything else ignored
//! ```
//!
//! Requests are independent: each handler touches only its own request's
//! cache entry, so no coordination is needed between concurrent tasks.

mod builder;
pub mod config;
pub mod host;
mod lifecycle;
pub mod routing;
mod strategy;

pub use builder::OfflineProxyBuilder;
pub use config::ProxyConfig;
pub use host::{HostControl, LocalHost};
pub use lifecycle::LifecycleState;
pub use routing::{RequestRouter, Route, Strategy};

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::Result;
use crate::cache::CacheStorage;
use crate::fetch::Fetcher;
use crate::telemetry;
use crate::types::{ControlMessage, EventOutcome, ProxyEvent, ProxyRequest, ProxyResponse};

use lifecycle::Lifecycle;
use strategy::BackgroundWrites;

/// Intercepts application requests and answers them from cache or network.
pub struct OfflineProxy {
    config: ProxyConfig,
    router: RequestRouter,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    host: Arc<dyn HostControl>,
    lifecycle: Lifecycle,
    writes: BackgroundWrites,
}

impl OfflineProxy {
    /// Create a new builder for configuring the proxy.
    pub fn builder() -> OfflineProxyBuilder {
        OfflineProxyBuilder::new()
    }

    pub(crate) fn new(
        config: ProxyConfig,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
        host: Arc<dyn HostControl>,
    ) -> Self {
        let router = RequestRouter::new(config.api_prefixes.clone());
        Self {
            config,
            router,
            storage,
            fetcher,
            host,
            lifecycle: Lifecycle::new(),
            writes: BackgroundWrites::default(),
        }
    }

    /// The configuration this proxy was built with.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The cache storage backing both generations.
    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.get()
    }

    /// Dispatch a host event.
    ///
    /// Only install and activate can fail; fetch and message handling always
    /// produce an outcome.
    pub async fn handle(&self, event: ProxyEvent) -> Result<EventOutcome> {
        match event {
            ProxyEvent::Install => {
                self.install().await?;
                Ok(EventOutcome::Installed)
            }
            ProxyEvent::Activate => {
                let deleted = self.activate().await?;
                Ok(EventOutcome::Activated { deleted })
            }
            ProxyEvent::Fetch(request) => Ok(self.dispatch_fetch(&request).await),
            ProxyEvent::Message(value) => Ok(self.handle_message(&value).await),
        }
    }

    /// Answer a request, or return `None` to leave it to the network.
    pub async fn handle_fetch(&self, request: &ProxyRequest) -> Option<ProxyResponse> {
        self.dispatch_fetch(request).await.into_response()
    }

    async fn dispatch_fetch(&self, request: &ProxyRequest) -> EventOutcome {
        match self.router.route(request) {
            Route::Passthrough(reason) => {
                trace!(
                    method = %request.method,
                    url = %request.url,
                    reason = reason.as_str(),
                    "passthrough"
                );
                metrics::counter!(telemetry::PASSTHROUGH_TOTAL, "reason" => reason.as_str())
                    .increment(1);
                EventOutcome::Passthrough(reason)
            }
            Route::Intercept(Strategy::CacheFirst) => {
                EventOutcome::Respond(self.cache_first(request).await)
            }
            Route::Intercept(Strategy::NetworkFirst) => {
                EventOutcome::Respond(self.network_first(request).await)
            }
        }
    }

    /// Act on a posted control message; unknown shapes are ignored.
    pub async fn handle_message(&self, value: &serde_json::Value) -> EventOutcome {
        match ControlMessage::parse(value) {
            Some(ControlMessage::SkipWaiting) => {
                if let Err(e) = self.skip_waiting().await {
                    warn!(error = %e, "skip waiting failed");
                }
                EventOutcome::MessageHandled
            }
            None => {
                debug!(message = %value, "ignoring unrecognised message");
                EventOutcome::Ignored
            }
        }
    }

    /// Wait for all background runtime-cache writes started so far.
    pub async fn settle(&self) {
        self.writes.settle().await;
    }
}
