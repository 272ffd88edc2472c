use anyhow::Result;
use async_trait::async_trait;

use crate::store::traits::ResponsePayload;

/// How a fetch is performed and what the captured payload may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Same-origin fetch; status, headers, and body are readable.
    Inspectable,
    /// Cross-origin fetch without credentials; the payload stays sealed.
    Opaque,
}

#[async_trait]
pub trait NetworkFetch: Send + Sync {
    /// Fetch `url`, capturing the response according to `mode`.
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<ResponsePayload>;
}
