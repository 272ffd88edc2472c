// Fetch routing: classify each request and serve cache-first with network fallback.

use std::sync::Arc;

use tracing::{debug, warn};

use super::stats::RouteStats;
use crate::error::CacheError;
use crate::manifest::{AssetClass, AssetManifest};
use crate::source::traits::{FetchMode, NetworkFetch};
use crate::store::traits::{MatchOptions, RequestKey, ResponsePayload, Store};

/// What the router decided for one intercepted request.
#[derive(Debug)]
pub enum RouteOutcome {
    /// The engine handled the request and produced a payload.
    Served(ResponsePayload),
    /// The request is unmanaged; the host's default handling applies.
    Passthrough,
}

pub struct Router {
    manifest: AssetManifest,
    fetcher: Arc<dyn NetworkFetch>,
    stats: Arc<RouteStats>,
}

impl Router {
    pub fn new(
        manifest: AssetManifest,
        fetcher: Arc<dyn NetworkFetch>,
        stats: Arc<RouteStats>,
    ) -> Self {
        Self {
            manifest,
            fetcher,
            stats,
        }
    }

    /// Route one intercepted request against the given version store. The
    /// store is only read here; routing never writes it.
    pub async fn route(
        &self,
        store: &dyn Store,
        request: &RequestKey,
    ) -> Result<RouteOutcome, CacheError> {
        match self.manifest.classify(&request.url) {
            AssetClass::Remote => self.route_remote(store, request).await,
            AssetClass::Local => self.route_local(store, request).await,
            AssetClass::Unmanaged => {
                self.stats.record_passthrough();
                Ok(RouteOutcome::Passthrough)
            }
        }
    }

    /// Remote assets match the store with the query string ignored. A miss
    /// is served by one fresh opaque fetch and is NOT written back; remote
    /// entries only ever land in the store at install time, so a missed
    /// asset stays uncached until the next version installs.
    async fn route_remote(
        &self,
        store: &dyn Store,
        request: &RequestKey,
    ) -> Result<RouteOutcome, CacheError> {
        let cached = store
            .match_key(request, MatchOptions { ignore_query: true })
            .await?;
        if let Some(payload) = cached {
            debug!("cache hit (remote) {}", request.url);
            self.stats.record_hit();
            return Ok(RouteOutcome::Served(payload));
        }

        self.stats.record_miss();
        self.stats.record_network_fetch();
        let payload = self
            .fetcher
            .fetch(&request.url, FetchMode::Opaque)
            .await
            .map_err(|source| CacheError::NetworkFetch {
                url: request.url.clone(),
                source,
            })?;
        Ok(RouteOutcome::Served(payload))
    }

    /// Local assets match the store exactly, query string significant. A
    /// miss falls through to a live fetch so development against an
    /// unpopulated cache still works.
    async fn route_local(
        &self,
        store: &dyn Store,
        request: &RequestKey,
    ) -> Result<RouteOutcome, CacheError> {
        let cached = store.match_key(request, MatchOptions::default()).await?;
        if let Some(payload) = cached {
            debug!("cache hit (local) {}", request.url);
            self.stats.record_hit();
            return Ok(RouteOutcome::Served(payload));
        }

        warn!("local asset not cached, fetching from network: {}", request.url);
        self.stats.record_miss();
        self.stats.record_network_fetch();
        let payload = self
            .fetcher
            .fetch(&request.url, FetchMode::Inspectable)
            .await
            .map_err(|source| CacheError::NetworkFetch {
                url: request.url.clone(),
                source,
            })?;
        Ok(RouteOutcome::Served(payload))
    }
}
