//! Cache-generation storage.
//!
//! The proxy keeps responses in named *generations*. Two are in use at any
//! time:
//!
//! - the **shell** generation, populated once at install with the precache
//!   list and replaced wholesale when its versioned name changes;
//!
//! - the **runtime** generation, filled opportunistically with successful
//!   live responses. It is never pruned, so it grows for as long as its name
//!   stays the same.
//!
//! Storage sits behind [`CacheStorage`] so a host can supply its own
//! persistent backend. [`MemoryCacheStorage`] is the in-process
//! implementation.

pub mod memory;

pub use memory::MemoryCacheStorage;

use async_trait::async_trait;

use crate::Result;
use crate::types::{ProxyResponse, RequestKey};

/// A lookup that found an entry, with the generation it was found in.
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub generation: String,
    pub response: ProxyResponse,
}

/// Named cache generations mapping request identity to a response snapshot.
///
/// Lookups never create a generation; writes create it on first use.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Names of all existing generations, in creation order.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Whether a generation with this name exists.
    async fn has(&self, generation: &str) -> Result<bool>;

    /// Delete a generation and everything in it.
    ///
    /// Returns `false` if it did not exist.
    async fn delete(&self, generation: &str) -> Result<bool>;

    /// Request identities stored in one generation.
    async fn entries(&self, generation: &str) -> Result<Vec<RequestKey>>;

    /// Look a request up in one generation.
    async fn match_in(&self, generation: &str, key: &RequestKey) -> Result<Option<ProxyResponse>>;

    /// Look a request up across all generations, in creation order.
    ///
    /// The first generation holding the key wins.
    async fn match_any(&self, key: &RequestKey) -> Result<Option<CacheHit>>;

    /// Store one entry, replacing any previous entry for the key.
    async fn put(&self, generation: &str, key: RequestKey, response: ProxyResponse) -> Result<()>;

    /// Store a batch so that readers see either none or all of it.
    async fn put_all(
        &self,
        generation: &str,
        entries: Vec<(RequestKey, ProxyResponse)>,
    ) -> Result<()>;
}
