//! Response snapshots returned and stored by the proxy

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

use crate::Result;

/// Message carried by the synthetic 503 returned for API requests while
/// offline.
pub const OFFLINE_API_MESSAGE: &str =
    "You are offline. Please connect to the internet to analyze text.";

/// Body of the synthetic page returned for static requests when neither the
/// network nor the offline page is available.
pub const OFFLINE_HTML: &str = "<!DOCTYPE html>\n\
<html>\n\
<head><meta charset=\"utf-8\"><title>CorBas - Offline</title></head>\n\
<body style=\"font-family: Arial; padding: 40px; text-align: center;\">\n\
<h1>You are offline</h1>\n\
<p>CorBas could not reach the network. Reconnect and reload the page.</p>\n\
</body>\n\
</html>\n";

/// Where a returned response came from.
///
/// Not part of the stored snapshot: a response read back from a cache is
/// re-tagged with the generation it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSource {
    /// Live network fetch.
    Network,
    /// Found in the named cache generation.
    Cache { generation: String },
    /// The precached offline fallback page.
    OfflinePage,
    /// Built by the proxy itself.
    Synthetic,
}

/// A response snapshot: status, headers and the full body.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub source: ResponseSource,
}

impl ProxyResponse {
    /// Create a network response with no headers.
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            source: ResponseSource::Network,
        }
    }

    /// Add a header, replacing any existing value.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Re-tag the response with where it came from.
    pub fn with_source(mut self, source: ResponseSource) -> Self {
        self.source = source;
        self
    }

    /// Minimal HTML page announcing the offline state.
    pub fn offline_html() -> Self {
        Self::new(StatusCode::OK, OFFLINE_HTML)
            .with_header(
                CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            )
            .with_source(ResponseSource::Synthetic)
    }

    /// `503 Service Unavailable` with a JSON `error` body.
    pub fn offline_api_error() -> Self {
        let body = serde_json::json!({ "error": OFFLINE_API_MESSAGE }).to_string();
        Self::new(StatusCode::SERVICE_UNAVAILABLE, body)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_source(ResponseSource::Synthetic)
    }

    /// Only exact `200 OK` responses are written to the runtime cache.
    pub fn is_cacheable(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Content type header, if present and valid UTF-8.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Body as lossy UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Compare status, headers and body, ignoring [`ResponseSource`].
    pub fn same_snapshot(&self, other: &ProxyResponse) -> bool {
        self.status == other.status && self.headers == other.headers && self.body == other.body
    }
}
