//! Telemetry metric name constants.
//!
//! Centralised metric names for offline proxy operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `corbas_offline_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `strategy` : "cache_first" or "network_first"
//! - `outcome` : where the response came from: "cache", "network",
//!   "offline_page" or "synthetic"
//! - `status` : "ok" or "error"
//! - `reason` : passthrough reason: "method" or "scheme"

/// Total intercepted requests answered by a strategy.
///
/// Labels: `strategy`, `outcome`.
pub const REQUESTS_TOTAL: &str = "corbas_offline_requests_total";

/// Requests not intercepted and left to default network handling.
///
/// Labels: `reason`.
pub const PASSTHROUGH_TOTAL: &str = "corbas_offline_passthrough_total";

/// Network fetch duration in seconds, successful or not.
///
/// Labels: `strategy`, `status`.
pub const FETCH_DURATION_SECONDS: &str = "corbas_offline_fetch_duration_seconds";

/// Cache lookups that found an entry.
///
/// Labels: `strategy`.
pub const CACHE_HITS_TOTAL: &str = "corbas_offline_cache_hits_total";

/// Cache lookups that found nothing.
///
/// Labels: `strategy`.
pub const CACHE_MISSES_TOTAL: &str = "corbas_offline_cache_misses_total";

/// Background writes into the runtime cache.
///
/// Labels: `status`.
pub const RUNTIME_WRITES_TOTAL: &str = "corbas_offline_runtime_writes_total";

/// Entries stored in the shell cache by a successful install.
pub const PRECACHED_ENTRIES_TOTAL: &str = "corbas_offline_precached_entries_total";

/// Stale cache generations deleted at activation.
pub const GENERATIONS_DELETED_TOTAL: &str = "corbas_offline_generations_deleted_total";
