//! corbas-offline - offline proxy for the CorBas web application
//!
//! The proxy intercepts the application's outgoing requests and decides, per
//! request, whether to answer from a local cache or from the network:
//!
//! - static assets are served **cache-first**, falling back to a precached
//!   offline page when the network is gone;
//! - API endpoints (`/analyze`, `/health`, `/highlight_pdf`) are served
//!   **network-first**, falling back to any cached copy and then to a JSON
//!   `503`.
//!
//! Install precaches the application shell; activation retires stale cache
//! generations. A `{"type": "SKIP_WAITING"}` message promotes a freshly
//! installed version immediately.
//!
//! # Example
//!
//! ```rust,no_run
//! use corbas_offline::{OfflineProxy, ProxyEvent, ProxyRequest};
//!
//! #[tokio::main]
//! async fn main() -> corbas_offline::Result<()> {
//!     let proxy = OfflineProxy::builder()
//!         .origin("http://127.0.0.1:5000")
//!         .version("v2")
//!         .build()?;
//!
//!     proxy.handle(ProxyEvent::Install).await?;
//!     proxy.handle(ProxyEvent::Activate).await?;
//!
//!     let request = ProxyRequest::parse(reqwest::Method::GET, "http://127.0.0.1:5000/health")?;
//!     if let Some(response) = proxy.handle_fetch(&request).await {
//!         println!("{} {}", response.status, response.text());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod fetch;
pub mod proxy;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use cache::{CacheHit, CacheStorage, MemoryCacheStorage};
pub use error::{OfflineError, Result};
pub use fetch::{Fetcher, HttpFetcher};
pub use proxy::{
    HostControl, LifecycleState, LocalHost, OfflineProxy, OfflineProxyBuilder, ProxyConfig,
    RequestRouter, Route, Strategy,
};
pub use version::version_string;

// Re-export all types
pub use types::{
    ControlMessage, EventOutcome, OFFLINE_API_MESSAGE, OFFLINE_HTML, PassthroughReason,
    ProxyEvent, ProxyRequest, ProxyResponse, RequestKey, ResponseSource,
};
