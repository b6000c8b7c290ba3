//! Install and activation.
//!
//! ```text
//! Parsed ──install──► Installing ──► Installed ──activate──► Activating ──► Activated
//!                          │                                     │
//!                          └──────────── failure ────────────────┴──► Redundant
//! ```
//!
//! Install populates the shell cache as one atomic batch and then asks the
//! host to skip the waiting phase. Activation deletes every generation whose
//! name is not current and claims open application instances.

use std::sync::{Mutex, PoisonError};

use futures_util::future::try_join_all;
use tracing::{info, instrument, warn};

use super::OfflineProxy;
use crate::telemetry;
use crate::types::{ProxyRequest, ProxyResponse, RequestKey};
use crate::version::version_string;
use crate::{OfflineError, Result};

/// Where the proxy is in its install/activate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, not yet installed.
    Parsed,
    /// Precaching the shell.
    Installing,
    /// Shell populated; waiting to activate.
    Installed,
    /// Retiring stale generations.
    Activating,
    /// Handling requests for all open instances.
    Activated,
    /// Install or activation failed; this version will never become active.
    Redundant,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LifecycleState::Parsed => "parsed",
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Activated => "activated",
            LifecycleState::Redundant => "redundant",
        };
        f.write_str(s)
    }
}

/// Lifecycle state cell.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    state: Mutex<LifecycleState>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(LifecycleState::Parsed),
        }
    }

    pub(crate) fn get(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set(&self, next: LifecycleState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Move from `expected` to `next`, or fail without changing anything.
    pub(crate) fn transition(&self, expected: LifecycleState, next: LifecycleState) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != expected {
            return Err(OfflineError::InvalidState {
                expected,
                actual: *state,
            });
        }
        *state = next;
        Ok(())
    }
}

impl OfflineProxy {
    /// Precache the shell and signal readiness to take over immediately.
    ///
    /// Any precache failure aborts the install: nothing is written to the
    /// shell cache and this proxy becomes [`LifecycleState::Redundant`],
    /// leaving whatever version was active before in charge. A host that
    /// refuses skip-waiting is logged and does not fail the install.
    #[instrument(skip(self), fields(shell = %self.config.shell_cache))]
    pub async fn install(&self) -> Result<()> {
        self.lifecycle
            .transition(LifecycleState::Parsed, LifecycleState::Installing)?;
        info!(
            version = %version_string(),
            entries = self.config.precache.len(),
            "installing offline proxy"
        );

        let count = match self.precache().await {
            Ok(count) => count,
            Err(e) => {
                self.lifecycle.set(LifecycleState::Redundant);
                warn!(error = %e, "install failed");
                return Err(e);
            }
        };
        metrics::counter!(telemetry::PRECACHED_ENTRIES_TOTAL).increment(count as u64);

        self.lifecycle.set(LifecycleState::Installed);
        info!(entries = count, "shell cache populated");

        // Install stands even when the host refuses the handoff.
        if let Err(e) = self.host.skip_waiting().await {
            warn!(error = %e, "skip waiting failed after install");
        }
        Ok(())
    }

    /// Fetch every precache entry, then store them all at once.
    async fn precache(&self) -> Result<usize> {
        let requests = self
            .config
            .precache
            .iter()
            .map(|path| self.config.resolve(path).map(ProxyRequest::get))
            .collect::<Result<Vec<_>>>()?;

        let entries = try_join_all(requests.iter().map(|r| self.precache_one(r))).await?;
        let count = entries.len();
        self.storage
            .put_all(&self.config.shell_cache, entries)
            .await?;
        Ok(count)
    }

    async fn precache_one(&self, request: &ProxyRequest) -> Result<(RequestKey, ProxyResponse)> {
        let response = self
            .fetcher
            .fetch(request)
            .await
            .map_err(|e| OfflineError::Precache {
                url: request.url.to_string(),
                reason: e.to_string(),
            })?;
        if !response.status.is_success() {
            return Err(OfflineError::Precache {
                url: request.url.to_string(),
                reason: format!("unexpected status {}", response.status),
            });
        }
        Ok((request.key(), response))
    }

    /// Delete stale generations and claim all open instances.
    ///
    /// Returns the names of the deleted generations. If either step fails
    /// this proxy becomes [`LifecycleState::Redundant`].
    #[instrument(skip(self))]
    pub async fn activate(&self) -> Result<Vec<String>> {
        self.lifecycle
            .transition(LifecycleState::Installed, LifecycleState::Activating)?;

        let deleted = match self.take_over().await {
            Ok(deleted) => deleted,
            Err(e) => {
                self.lifecycle.set(LifecycleState::Redundant);
                warn!(error = %e, "activation failed");
                return Err(e);
            }
        };

        self.lifecycle.set(LifecycleState::Activated);
        info!(
            version = %version_string(),
            deleted = deleted.len(),
            "offline proxy activated"
        );
        Ok(deleted)
    }

    async fn take_over(&self) -> Result<Vec<String>> {
        let deleted = self.retire_stale_generations().await?;
        self.host.claim_clients().await?;
        Ok(deleted)
    }

    async fn retire_stale_generations(&self) -> Result<Vec<String>> {
        let mut deleted = Vec::new();
        for name in self.storage.keys().await? {
            if name == self.config.shell_cache || name == self.config.runtime_cache {
                continue;
            }
            if self.storage.delete(&name).await? {
                info!(generation = %name, "deleted stale cache generation");
                deleted.push(name);
            }
        }
        metrics::counter!(telemetry::GENERATIONS_DELETED_TOTAL).increment(deleted.len() as u64);
        Ok(deleted)
    }

    /// Ask the host to promote this version without waiting.
    ///
    /// Safe to call repeatedly.
    pub async fn skip_waiting(&self) -> Result<()> {
        info!("skip waiting requested");
        self.host.skip_waiting().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_checks_expected_state() {
        let lifecycle = Lifecycle::new();
        lifecycle
            .transition(LifecycleState::Parsed, LifecycleState::Installing)
            .unwrap();
        let err = lifecycle
            .transition(LifecycleState::Parsed, LifecycleState::Installing)
            .unwrap_err();
        assert!(matches!(
            err,
            OfflineError::InvalidState {
                expected: LifecycleState::Parsed,
                actual: LifecycleState::Installing,
            }
        ));
        assert_eq!(lifecycle.get(), LifecycleState::Installing);
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(LifecycleState::Activated.to_string(), "activated");
        assert_eq!(LifecycleState::Redundant.to_string(), "redundant");
    }
}
