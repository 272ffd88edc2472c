// Engine wiring: one object owning the collaborators and the three lifecycle handlers.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;

use super::activator::Activator;
use super::installer::Installer;
use super::router::{RouteOutcome, Router};
use super::stats::{RouteStats, StatsSnapshot};
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::manifest::AssetManifest;
use crate::runtime::bus::EventHandlers;
use crate::runtime::clients::SessionControl;
use crate::source::traits::NetworkFetch;
use crate::store::traits::{RequestKey, Store, StoreBackend};

/// The cache engine for one deployed version. Owns the injected
/// collaborators, constructs the three phase objects, and implements the
/// lifecycle handlers a host bus dispatches to.
pub struct CacheEngine {
    config: CacheConfig,
    backend: Arc<dyn StoreBackend>,
    installer: Installer,
    activator: Activator,
    router: Router,
    stats: Arc<RouteStats>,
    current_store: RwLock<Option<Arc<dyn Store>>>,
    store_init_lock: Mutex<()>,
}

impl CacheEngine {
    pub fn new(
        config: CacheConfig,
        manifest: AssetManifest,
        backend: Arc<dyn StoreBackend>,
        fetcher: Arc<dyn NetworkFetch>,
        sessions: Arc<dyn SessionControl>,
    ) -> Self {
        let stats = Arc::new(RouteStats::new());
        let installer = Installer::new(
            config.clone(),
            manifest.clone(),
            backend.clone(),
            fetcher.clone(),
            sessions.clone(),
        );
        let activator = Activator::new(config.clone(), backend.clone(), sessions);
        let router = Router::new(manifest, fetcher, stats.clone());
        Self {
            config,
            backend,
            installer,
            activator,
            router,
            stats,
            current_store: RwLock::new(None),
            store_init_lock: Mutex::new(()),
        }
    }

    /// Routing statistics for the lifetime of this engine.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// The store for the configured version, opened once and reused.
    async fn current_store(&self) -> Result<Arc<dyn Store>> {
        if let Some(store) = self.current_store.read().clone() {
            return Ok(store);
        }

        let _guard = self.store_init_lock.lock().await;
        if let Some(store) = self.current_store.read().clone() {
            return Ok(store);
        }

        let store = self.backend.open(&self.config.store_name()).await?;
        *self.current_store.write() = Some(store.clone());
        Ok(store)
    }
}

#[async_trait]
impl EventHandlers for CacheEngine {
    async fn on_install(&self) -> Result<(), CacheError> {
        self.installer.install().await
    }

    async fn on_activate(&self) -> Result<(), CacheError> {
        self.activator.activate().await
    }

    async fn on_fetch(&self, request: &RequestKey) -> Result<RouteOutcome, CacheError> {
        let store = self.current_store().await?;
        self.router.route(store.as_ref(), request).await
    }
}
