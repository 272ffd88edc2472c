// Activation phase: evict stale version stores and claim open sessions.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::runtime::clients::SessionControl;
use crate::store::traits::StoreBackend;

pub struct Activator {
    config: CacheConfig,
    backend: Arc<dyn StoreBackend>,
    sessions: Arc<dyn SessionControl>,
}

impl Activator {
    pub fn new(
        config: CacheConfig,
        backend: Arc<dyn StoreBackend>,
        sessions: Arc<dyn SessionControl>,
    ) -> Self {
        Self {
            config,
            backend,
            sessions,
        }
    }

    /// Run the activation phase: delete every store in this namespace that
    /// is not the current version, then claim already-open sessions so they
    /// switch to this version without a reload.
    ///
    /// Deletions run concurrently and are independent; a failed deletion is
    /// logged and left for a future activation to retry.
    pub async fn activate(&self) -> Result<(), CacheError> {
        let current = self.config.store_name();
        let prefix = self.config.store_prefix();
        info!("activating {}", current);

        let names = self.backend.list_store_names().await?;
        let stale: Vec<String> = names
            .into_iter()
            .filter(|name| name.starts_with(&prefix) && *name != current)
            .collect();

        let deletions = stale.iter().map(|name| async move {
            match self.backend.delete_store(name).await {
                Ok(true) => info!("deleted stale store {}", name),
                Ok(false) => debug!("stale store {} already gone", name),
                Err(source) => {
                    let err = CacheError::StoreDeletion {
                        name: name.clone(),
                        source,
                    };
                    warn!("activation continuing: {:#}", anyhow::Error::new(err));
                }
            }
        });
        join_all(deletions).await;

        self.sessions.claim_open_sessions().await;
        info!("activation {} complete", current);
        Ok(())
    }
}
