// Install phase: populate a fresh version-named store from the asset manifests.

use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use tracing::{info, warn};

use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::manifest::AssetManifest;
use crate::runtime::clients::SessionControl;
use crate::source::traits::{FetchMode, NetworkFetch};
use crate::store::traits::{RequestKey, Store, StoreBackend};

pub struct Installer {
    config: CacheConfig,
    manifest: AssetManifest,
    backend: Arc<dyn StoreBackend>,
    fetcher: Arc<dyn NetworkFetch>,
    sessions: Arc<dyn SessionControl>,
}

impl Installer {
    pub fn new(
        config: CacheConfig,
        manifest: AssetManifest,
        backend: Arc<dyn StoreBackend>,
        fetcher: Arc<dyn NetworkFetch>,
        sessions: Arc<dyn SessionControl>,
    ) -> Self {
        Self {
            config,
            manifest,
            backend,
            fetcher,
            sessions,
        }
    }

    /// Run the install phase: open the version store, populate the required
    /// local assets as one atomic step, then the best-effort remote assets,
    /// then signal immediate supersession of any waiting older version.
    ///
    /// On a required-asset failure the partially populated store is
    /// abandoned as-is; the host retries the install later and the old
    /// version keeps serving.
    pub async fn install(&self) -> Result<(), CacheError> {
        let store_name = self.config.store_name();
        info!("installing {}", store_name);

        let store = self.backend.open(&store_name).await?;

        self.populate_required(store.as_ref()).await?;
        self.populate_best_effort(store.as_ref()).await;

        self.sessions.supersede_waiting().await;
        info!("install {} complete", store_name);
        Ok(())
    }

    /// Fetch every required local asset concurrently and write the whole
    /// batch in one step. Any failure aborts before a single write.
    async fn populate_required(&self, store: &dyn Store) -> Result<(), CacheError> {
        let fetches = self.manifest.required_local.iter().map(|path| {
            let url = if path.starts_with('/') {
                self.config.local_url(path)
            } else {
                path.clone()
            };
            async move {
                let payload = self
                    .fetcher
                    .fetch(&url, FetchMode::Inspectable)
                    .await
                    .map_err(|source| CacheError::RequiredAssetFetch {
                        url: url.clone(),
                        source,
                    })?;
                Ok::<_, CacheError>((RequestKey::get(url), payload))
            }
        });

        let entries = try_join_all(fetches).await?;
        store.put_all(entries).await?;
        Ok(())
    }

    /// Fetch and store each best-effort remote asset in isolation. A
    /// failure is logged and skipped; it never aborts the install.
    async fn populate_best_effort(&self, store: &dyn Store) {
        let attempts = self.manifest.best_effort_remote.iter().map(|url| async move {
            if let Err(err) = self.cache_one_remote(store, url).await {
                warn!("install continuing: {:#}", anyhow::Error::new(err));
            }
        });

        join_all(attempts).await;
    }

    async fn cache_one_remote(&self, store: &dyn Store, url: &str) -> Result<(), CacheError> {
        let wrap = |source: anyhow::Error| CacheError::BestEffortAsset {
            url: url.to_string(),
            source,
        };
        let payload = self
            .fetcher
            .fetch(url, FetchMode::Opaque)
            .await
            .map_err(wrap)?;
        store.put(&RequestKey::get(url), payload).await.map_err(wrap)?;
        Ok(())
    }
}
