use thiserror::Error;

/// Failure taxonomy across the install, activate, and routing phases.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A required local asset could not be fetched or stored. Fatal to the
    /// whole install phase; the old version stays active.
    #[error("required asset failed: {url}")]
    RequiredAssetFetch {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// A best-effort remote asset could not be fetched or stored. Logged
    /// and skipped, never fatal to the install.
    #[error("best-effort asset failed: {url}")]
    BestEffortAsset {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// A stale store could not be deleted. Non-fatal; the store is retried
    /// on a future activation.
    #[error("store deletion failed: {name}")]
    StoreDeletion {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// A routed network fetch failed. Surfaces to the original requester
    /// as a failed request; no retry, no backoff.
    #[error("network fetch failed: {url}")]
    NetworkFetch {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// The store backend itself failed.
    #[error("store operation failed")]
    Store(#[from] anyhow::Error),
}
