//! Tests for metrics emitted by request handling.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use reqwest::{Method, StatusCode};

use corbas_offline::telemetry;
use corbas_offline::{Fetcher, OfflineError, OfflineProxy, ProxyRequest, ProxyResponse, Result};

// ============================================================================
// Mock fetcher
// ============================================================================

struct ToggleFetcher {
    offline: AtomicBool,
}

#[async_trait]
impl Fetcher for ToggleFetcher {
    fn name(&self) -> &str {
        "toggle"
    }

    async fn fetch(&self, _request: &ProxyRequest) -> Result<ProxyResponse> {
        if self.offline.load(Ordering::SeqCst) {
            Err(OfflineError::Network("offline".into()))
        } else {
            Ok(ProxyResponse::new(StatusCode::OK, "ok"))
        }
    }
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a metric name and a label value.
fn counter_with(snapshot: &SnapshotVec, name: &str, label: (&str, &str)) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .filter(|(key, _, _, _)| {
            key.key()
                .labels()
                .any(|l| l.key() == label.0 && l.value() == label.1)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

fn proxy(offline: bool) -> OfflineProxy {
    OfflineProxy::builder()
        .fetcher(Arc::new(ToggleFetcher {
            offline: AtomicBool::new(offline),
        }))
        .build()
        .unwrap()
}

fn get(path: &str) -> ProxyRequest {
    ProxyRequest::parse(Method::GET, &format!("http://127.0.0.1:5000{path}")).unwrap()
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn network_response_records_request_and_fetch_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let proxy = proxy(false);
                proxy.handle_fetch(&get("/health")).await.unwrap();
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_with(&snapshot, telemetry::REQUESTS_TOTAL, ("outcome", "network")),
        1
    );
    assert_eq!(
        counter_with(
            &snapshot,
            telemetry::REQUESTS_TOTAL,
            ("strategy", "network_first")
        ),
        1
    );
    assert!(has_histogram(&snapshot, telemetry::FETCH_DURATION_SECONDS));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn offline_api_request_records_synthetic_outcome() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let proxy = proxy(true);
                proxy.handle_fetch(&get("/analyze")).await.unwrap();
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_with(&snapshot, telemetry::REQUESTS_TOTAL, ("outcome", "synthetic")),
        1
    );
    assert_eq!(
        counter_with(
            &snapshot,
            telemetry::CACHE_MISSES_TOTAL,
            ("strategy", "network_first")
        ),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn passthrough_records_reason() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let proxy = proxy(false);
                let post =
                    ProxyRequest::parse(Method::POST, "http://127.0.0.1:5000/analyze").unwrap();
                assert!(proxy.handle_fetch(&post).await.is_none());
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_with(&snapshot, telemetry::PASSTHROUGH_TOTAL, ("reason", "method")),
        1
    );
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let proxy = proxy(false);
    proxy.handle_fetch(&get("/corbas.html")).await.unwrap();
    proxy.settle().await;
}
