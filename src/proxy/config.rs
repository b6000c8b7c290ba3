//! Static configuration for the offline proxy.
//!
//! Everything the proxy takes as input lives here: the origin it fronts, the
//! precache list, the two cache-generation names and the API prefixes routed
//! network-first. Defaults match the CorBas backend, whose only page is
//! `/corbas.html`; that page doubles as the offline fallback.
//!
//! # Versioning rule
//!
//! Whenever precached content changes, bump **both** cache names together
//! (see [`ProxyConfig::version`]). Activation deletes every generation whose
//! name is not current, so a bump forces full invalidation.
//!
//! # TOML
//!
//! ```toml
//! origin = "http://127.0.0.1:5000"
//! precache = ["/", "/corbas.html", "/offline.html"]
//! shell_cache = "corbas-shell-v2"
//! runtime_cache = "corbas-runtime-v2"
//! api_prefixes = ["/analyze", "/health", "/highlight_pdf"]
//! offline_page = "/offline.html"
//! ```

use std::fs;
use std::path::Path;

use reqwest::Url;
use serde::Deserialize;

use crate::{OfflineError, Result};

/// Offline proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyConfig {
    /// Origin that relative precache paths resolve against
    /// (default: http://127.0.0.1:5000).
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Paths fetched and stored at install, in order.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,
    /// Name of the shell cache generation.
    #[serde(default = "default_shell_cache")]
    pub shell_cache: String,
    /// Name of the runtime cache generation.
    #[serde(default = "default_runtime_cache")]
    pub runtime_cache: String,
    /// Path prefixes served network-first.
    #[serde(default = "default_api_prefixes")]
    pub api_prefixes: Vec<String>,
    /// Precached page served to static requests while offline.
    #[serde(default = "default_offline_page")]
    pub offline_page: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            precache: default_precache(),
            shell_cache: default_shell_cache(),
            runtime_cache: default_runtime_cache(),
            api_prefixes: default_api_prefixes(),
            offline_page: default_offline_page(),
        }
    }
}

fn default_origin() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_precache() -> Vec<String> {
    vec!["/corbas.html".to_string()]
}

fn default_shell_cache() -> String {
    "corbas-shell-v1".to_string()
}

fn default_runtime_cache() -> String {
    "corbas-runtime-v1".to_string()
}

fn default_api_prefixes() -> Vec<String> {
    vec![
        "/analyze".to_string(),
        "/health".to_string(),
        "/highlight_pdf".to_string(),
    ]
}

fn default_offline_page() -> String {
    "/corbas.html".to_string()
}

impl ProxyConfig {
    /// Create a config with CorBas defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the origin.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Replace the precache list.
    pub fn precache<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.precache = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the shell cache name.
    pub fn shell_cache(mut self, name: impl Into<String>) -> Self {
        self.shell_cache = name.into();
        self
    }

    /// Set the runtime cache name.
    pub fn runtime_cache(mut self, name: impl Into<String>) -> Self {
        self.runtime_cache = name.into();
        self
    }

    /// Bump both cache names to `corbas-shell-{version}` and
    /// `corbas-runtime-{version}`.
    pub fn version(self, version: &str) -> Self {
        self.shell_cache(format!("corbas-shell-{version}"))
            .runtime_cache(format!("corbas-runtime-{version}"))
    }

    /// Replace the network-first prefixes.
    pub fn api_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.api_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the offline fallback page path.
    pub fn offline_page(mut self, path: impl Into<String>) -> Self {
        self.offline_page = path.into();
        self
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| OfflineError::Configuration(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            OfflineError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            OfflineError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Parsed origin URL.
    pub fn origin_url(&self) -> Result<Url> {
        Url::parse(&self.origin)
            .map_err(|e| OfflineError::InvalidUrl(format!("{}: {e}", self.origin)))
    }

    /// Resolve a path (or absolute URL) against the origin.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.origin_url()?
            .join(path)
            .map_err(|e| OfflineError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        let origin = self.origin_url()?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(OfflineError::Configuration(format!(
                "origin must be http or https, got {}",
                origin.scheme()
            )));
        }
        if self.shell_cache.is_empty() || self.runtime_cache.is_empty() {
            return Err(OfflineError::Configuration(
                "cache names must not be empty".to_string(),
            ));
        }
        if self.shell_cache == self.runtime_cache {
            return Err(OfflineError::Configuration(format!(
                "shell and runtime caches share the name {}",
                self.shell_cache
            )));
        }
        if let Some(bad) = self.api_prefixes.iter().find(|p| !p.starts_with('/')) {
            return Err(OfflineError::Configuration(format!(
                "API prefix must start with '/': {bad}"
            )));
        }
        for path in &self.precache {
            self.resolve(path)?;
        }
        self.resolve(&self.offline_page)?;
        Ok(())
    }

    /// Whether the offline page is part of the precache list.
    pub(crate) fn offline_page_is_precached(&self) -> bool {
        self.precache.iter().any(|p| p == &self.offline_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend() {
        let config = ProxyConfig::default();
        assert_eq!(config.origin, "http://127.0.0.1:5000");
        assert_eq!(config.api_prefixes, ["/analyze", "/health", "/highlight_pdf"]);
        assert_eq!(config.precache, ["/corbas.html"]);
        assert!(config.offline_page_is_precached());
        config.validate().unwrap();
    }

    #[test]
    fn version_bumps_both_names() {
        let config = ProxyConfig::new().version("v7");
        assert_eq!(config.shell_cache, "corbas-shell-v7");
        assert_eq!(config.runtime_cache, "corbas-runtime-v7");
    }

    #[test]
    fn resolve_joins_against_origin() {
        let config = ProxyConfig::new().origin("https://corbas.example/app/");
        assert_eq!(
            config.resolve("/offline.html").unwrap().as_str(),
            "https://corbas.example/offline.html"
        );
        assert_eq!(
            config.resolve("style.css").unwrap().as_str(),
            "https://corbas.example/app/style.css"
        );
    }

    #[test]
    fn validate_rejects_shared_names() {
        let config = ProxyConfig::new().shell_cache("same").runtime_cache("same");
        assert!(matches!(
            config.validate(),
            Err(OfflineError::Configuration(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_name() {
        let config = ProxyConfig::new().runtime_cache("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_relative_prefix() {
        let config = ProxyConfig::new().api_prefixes(["analyze"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_web_origin() {
        let config = ProxyConfig::new().origin("ftp://127.0.0.1");
        assert!(config.validate().is_err());
        let config = ProxyConfig::new().origin("not a url");
        assert!(matches!(config.validate(), Err(OfflineError::InvalidUrl(_))));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ProxyConfig::from_toml_str(
            r#"
            shell_cache = "corbas-shell-v2"
            runtime_cache = "corbas-runtime-v2"
            "#,
        )
        .unwrap();
        assert_eq!(config.shell_cache, "corbas-shell-v2");
        assert_eq!(config.precache, default_precache());
        assert_eq!(config.offline_page, "/corbas.html");
    }

    #[test]
    fn malformed_toml_is_configuration_error() {
        let err = ProxyConfig::from_toml_str("precache = 3").unwrap_err();
        assert!(matches!(err, OfflineError::Configuration(_)));
    }
}
