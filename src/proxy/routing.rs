//! Request classification.
//!
//! Decides, per request, whether the proxy intercepts it and which caching
//! strategy answers it. Pure and stateless: a lookup over method, scheme and
//! path prefix.

use reqwest::Method;

use crate::types::{PassthroughReason, ProxyRequest};

/// Caching strategy for an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Static assets: cache, then network, then offline page.
    CacheFirst,
    /// API endpoints: network, then any cache, then a synthetic 503.
    NetworkFirst,
}

impl Strategy {
    /// Metric/log label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cache_first",
            Strategy::NetworkFirst => "network_first",
        }
    }
}

/// Disposition of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Intercept(Strategy),
    Passthrough(PassthroughReason),
}

/// Routes requests by method, scheme and path prefix.
#[derive(Debug, Clone)]
pub struct RequestRouter {
    api_prefixes: Vec<String>,
}

impl RequestRouter {
    /// Create a router sending `api_prefixes` network-first.
    pub fn new(api_prefixes: Vec<String>) -> Self {
        Self { api_prefixes }
    }

    /// Classify a request.
    pub fn route(&self, request: &ProxyRequest) -> Route {
        if request.method != Method::GET {
            return Route::Passthrough(PassthroughReason::Method);
        }
        if !matches!(request.url.scheme(), "http" | "https") {
            return Route::Passthrough(PassthroughReason::Scheme);
        }
        Route::Intercept(self.strategy_for(request.url.path()))
    }

    /// Strategy for a path, ignoring method and scheme.
    pub fn strategy_for(&self, path: &str) -> Strategy {
        if self.api_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            Strategy::NetworkFirst
        } else {
            Strategy::CacheFirst
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> RequestRouter {
        RequestRouter::new(vec![
            "/analyze".into(),
            "/health".into(),
            "/highlight_pdf".into(),
        ])
    }

    fn get(url: &str) -> ProxyRequest {
        ProxyRequest::parse(Method::GET, url).unwrap()
    }

    #[test]
    fn api_prefixes_are_network_first() {
        let r = router();
        for url in [
            "http://127.0.0.1:5000/analyze",
            "http://127.0.0.1:5000/health",
            "http://127.0.0.1:5000/highlight_pdf",
            "http://127.0.0.1:5000/health?verbose=1",
        ] {
            assert_eq!(
                r.route(&get(url)),
                Route::Intercept(Strategy::NetworkFirst),
                "{url}"
            );
        }
    }

    #[test]
    fn prefix_match_is_plain_starts_with() {
        let r = router();
        assert_eq!(r.strategy_for("/analyze/batch"), Strategy::NetworkFirst);
        assert_eq!(r.strategy_for("/analyzer.js"), Strategy::NetworkFirst);
        assert_eq!(r.strategy_for("/static/analyze"), Strategy::CacheFirst);
    }

    #[test]
    fn everything_else_is_cache_first() {
        let r = router();
        for url in [
            "http://127.0.0.1:5000/",
            "http://127.0.0.1:5000/corbas.html",
            "https://cdn.example/lib.js",
        ] {
            assert_eq!(
                r.route(&get(url)),
                Route::Intercept(Strategy::CacheFirst),
                "{url}"
            );
        }
    }

    #[test]
    fn non_get_passes_through() {
        let r = router();
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
            let req = ProxyRequest::parse(method.clone(), "http://127.0.0.1:5000/analyze").unwrap();
            assert_eq!(
                r.route(&req),
                Route::Passthrough(PassthroughReason::Method),
                "{method}"
            );
        }
    }

    #[test]
    fn non_web_scheme_passes_through() {
        let r = router();
        for url in [
            "chrome-extension://abcdef/script.js",
            "data:text/plain,hello",
            "file:///tmp/corbas.html",
        ] {
            assert_eq!(
                r.route(&get(url)),
                Route::Passthrough(PassthroughReason::Scheme),
                "{url}"
            );
        }
    }
}
