use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Identity of a cacheable request: URL plus method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub url: String,
    pub method: String,
}

impl RequestKey {
    /// Key for a GET request, the only method assets are cached under.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
        }
    }

    /// The same key with any query string and fragment stripped.
    pub fn without_query(&self) -> Self {
        let url = self
            .url
            .split(['?', '#'])
            .next()
            .unwrap_or(&self.url)
            .to_string();
        Self {
            url,
            method: self.method.clone(),
        }
    }
}

/// Lookup options for [`Store::match_key`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchOptions {
    /// Compare request URLs with the query string stripped.
    pub ignore_query: bool,
}

/// A same-origin response captured with full inspection rights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectableResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

/// A cross-origin response captured without inspection rights. It can be
/// stored and replayed verbatim; status and body stay sealed.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct OpaqueResponse {
    body: Bytes,
}

impl OpaqueResponse {
    /// Seal a transport capture. Fetch implementations call this; nothing
    /// else can look inside afterwards.
    pub fn capture(body: Bytes) -> Self {
        Self { body }
    }
}

impl std::fmt::Debug for OpaqueResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OpaqueResponse(sealed)")
    }
}

/// A captured response payload, inspectable or opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponsePayload {
    Inspectable(InspectableResponse),
    Opaque(OpaqueResponse),
}

/// One named, versioned key-to-payload mapping.
#[async_trait]
pub trait Store: Send + Sync {
    /// Store one payload under the given key, replacing any earlier entry.
    async fn put(&self, key: &RequestKey, payload: ResponsePayload) -> Result<()>;

    /// Store a batch of payloads as one step.
    async fn put_all(&self, entries: Vec<(RequestKey, ResponsePayload)>) -> Result<()>;

    /// Look up a payload for the key. With `ignore_query` set the URL
    /// comparison is query-string-insensitive.
    async fn match_key(
        &self,
        key: &RequestKey,
        options: MatchOptions,
    ) -> Result<Option<ResponsePayload>>;
}

/// The persistent namespace of stores known to the host runtime.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Open the store with the given name, creating it if absent.
    async fn open(&self, name: &str) -> Result<Arc<dyn Store>>;

    /// Names of every store known to the backend.
    async fn list_store_names(&self) -> Result<Vec<String>>;

    /// Delete a store. Returns `true` if it existed.
    async fn delete_store(&self, name: &str) -> Result<bool>;
}
