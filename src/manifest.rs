// Asset manifests and request classification.

use reqwest::Url;
use serde::Deserialize;

use crate::config::{DEFAULT_LOCAL_ASSETS, DEFAULT_REMOTE_ASSETS};

/// Classification of an intercepted request URL. Every request falls into
/// exactly one class, decided by the URL alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    /// Cross-origin asset matched by prefix against the remote manifest.
    Remote,
    /// Same-origin asset shipped with the application bundle.
    Local,
    /// Everything else; the engine does not intercept it.
    Unmanaged,
}

/// URL manifests compiled in with one deployed version.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetManifest {
    /// Same-origin paths that must all cache for an install to succeed.
    pub required_local: Vec<String>,
    /// Cross-origin URL prefixes cached best-effort in opaque mode.
    pub best_effort_remote: Vec<String>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            required_local: DEFAULT_LOCAL_ASSETS.iter().map(|s| s.to_string()).collect(),
            best_effort_remote: DEFAULT_REMOTE_ASSETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AssetManifest {
    /// Classify a request URL. Remote prefixes are tested first against the
    /// full absolute URL; local membership is an exact match on the
    /// normalized path.
    pub fn classify(&self, url: &str) -> AssetClass {
        if self
            .best_effort_remote
            .iter()
            .any(|prefix| url.starts_with(prefix.as_str()))
        {
            return AssetClass::Remote;
        }

        if let Some(path) = normalize_path(url) {
            if self.required_local.iter().any(|entry| *entry == path) {
                return AssetClass::Local;
            }
        }

        AssetClass::Unmanaged
    }
}

/// Reduce a request URL to the leading-slash path form the local manifest
/// is written in. Query strings and fragments do not participate in
/// classification.
fn normalize_path(url: &str) -> Option<String> {
    if url.starts_with('/') {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        return Some(path.to_string());
    }
    let parsed = Url::parse(url).ok()?;
    Some(parsed.path().to_string())
}
