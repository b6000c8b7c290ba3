//! Intercepted requests and their cache identity

use reqwest::header::HeaderMap;
use reqwest::{Method, Url};

use crate::{OfflineError, Result};

/// An outgoing application request seen by the proxy.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl ProxyRequest {
    /// Create a request with no headers and no body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Create a `GET` request.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Parse `url` and create a request for it.
    pub fn parse(method: Method, url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| OfflineError::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self::new(method, url))
    }

    /// Attach headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Attach a body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Cache identity of this request.
    pub fn key(&self) -> RequestKey {
        RequestKey::new(self.method.clone(), &self.url)
    }
}

/// Identity of a request inside a cache generation.
///
/// Method plus URL with the fragment stripped. Headers never take part, so
/// two requests for the same resource with different `Accept` or cookie
/// headers share one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    method: Method,
    url: String,
}

impl RequestKey {
    pub fn new(method: Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self {
            method,
            url: url.into(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{ACCEPT, HeaderValue};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn key_ignores_fragment() {
        let a = ProxyRequest::get(url("http://localhost/app.js#v1")).key();
        let b = ProxyRequest::get(url("http://localhost/app.js")).key();
        assert_eq!(a, b);
        assert_eq!(a.url(), "http://localhost/app.js");
    }

    #[test]
    fn key_ignores_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));
        let a = ProxyRequest::get(url("http://localhost/")).with_headers(headers);
        let b = ProxyRequest::get(url("http://localhost/"));
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn key_distinguishes_method_and_query() {
        let get = ProxyRequest::get(url("http://localhost/health")).key();
        let head = ProxyRequest::new(Method::HEAD, url("http://localhost/health")).key();
        let query = ProxyRequest::get(url("http://localhost/health?x=1")).key();
        assert_ne!(get, head);
        assert_ne!(get, query);
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = ProxyRequest::parse(Method::GET, "not a url").unwrap_err();
        assert!(matches!(err, OfflineError::InvalidUrl(_)));
    }

    #[test]
    fn key_displays_method_and_url() {
        let key = ProxyRequest::get(url("http://localhost/a")).key();
        assert_eq!(key.to_string(), "GET http://localhost/a");
    }
}
