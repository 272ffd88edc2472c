use serde::Deserialize;

/// Namespace prefix shared by every store this application owns.
pub const DEFAULT_NAMESPACE: &str = "app-shell";

/// Version identifier. Must change on every deployable update so the host
/// runtime triggers a fresh install/activate cycle.
pub const DEFAULT_VERSION: &str = "v12";

/// Origin that same-origin asset paths resolve against.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8080";

/// Same-origin assets that must all be cached for an install to succeed.
pub const DEFAULT_LOCAL_ASSETS: &[&str] = &[
    "/", // alias for index.html
    "/index.html",
    "/manifest.json",
    "/icon-192.png",
    "/icon-512.png",
];

/// Cross-origin URL prefixes cached best-effort in opaque mode.
pub const DEFAULT_REMOTE_ASSETS: &[&str] = &[
    "https://cdn.tailwindcss.com/",
    "https://unpkg.com/dexie@3/dist/dexie.js",
    "https://unpkg.com/lucide@latest",
    "https://cdnjs.cloudflare.com/ajax/libs/jszip/3.10.1/jszip.min.js",
    "https://cdnjs.cloudflare.com/ajax/libs/FileSaver.js/2.0.0/FileSaver.min.js",
    "https://cdnjs.cloudflare.com/ajax/libs/jspdf/2.5.1/jspdf.umd.min.js",
];

/// Identity of one deployed cache generation.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Namespace prefix shared by every store this application owns.
    pub namespace: String,
    /// Version identifier; bumping it retires all earlier stores.
    pub version: String,
    /// Origin that same-origin asset paths resolve against.
    pub origin: String,
}

impl CacheConfig {
    /// Store name for this version, e.g. `app-shell-v12`.
    pub fn store_name(&self) -> String {
        format!("{}-{}", self.namespace, self.version)
    }

    /// Prefix identifying every store in this namespace regardless of version.
    pub fn store_prefix(&self) -> String {
        format!("{}-", self.namespace)
    }

    /// Absolute URL for a same-origin asset path.
    pub fn local_url(&self, path: &str) -> String {
        format!("{}{}", self.origin.trim_end_matches('/'), path)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            version: DEFAULT_VERSION.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
        }
    }
}
