//! Activation-handoff primitives provided by the host platform.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;

use crate::Result;

/// Control over how a newly installed version takes over.
///
/// Both operations are idempotent: repeating one has the same effect as
/// calling it once.
#[async_trait]
pub trait HostControl: Send + Sync {
    /// Promote the installed version to active without waiting for existing
    /// instances to finish.
    async fn skip_waiting(&self) -> Result<()>;

    /// Take control of all open application instances immediately, so they
    /// do not need a reload.
    async fn claim_clients(&self) -> Result<()>;
}

/// In-process [`HostControl`] that records what was requested.
#[derive(Debug, Default)]
pub struct LocalHost {
    waiting_skipped: AtomicBool,
    clients_claimed: AtomicBool,
    skip_waiting_calls: AtomicU64,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether skip-waiting has been requested.
    pub fn waiting_skipped(&self) -> bool {
        self.waiting_skipped.load(Ordering::SeqCst)
    }

    /// Whether open instances have been claimed.
    pub fn clients_claimed(&self) -> bool {
        self.clients_claimed.load(Ordering::SeqCst)
    }

    /// How many times skip-waiting was requested.
    pub fn skip_waiting_calls(&self) -> u64 {
        self.skip_waiting_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostControl for LocalHost {
    async fn skip_waiting(&self) -> Result<()> {
        self.skip_waiting_calls.fetch_add(1, Ordering::SeqCst);
        self.waiting_skipped.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn claim_clients(&self) -> Result<()> {
        self.clients_claimed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
