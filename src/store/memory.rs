// In-process store backend, for tests and embedders without persistence.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{MatchOptions, RequestKey, ResponsePayload, Store, StoreBackend};

/// Store backend holding every store in process memory.
#[derive(Default)]
pub struct MemoryBackend {
    stores: RwLock<HashMap<String, Arc<MemoryStore>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn open(&self, name: &str) -> Result<Arc<dyn Store>> {
        let mut stores = self.stores.write();
        let store = stores
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryStore::default()))
            .clone();
        Ok(store)
    }

    async fn list_store_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.stores.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete_store(&self, name: &str) -> Result<bool> {
        Ok(self.stores.write().remove(name).is_some())
    }
}

/// One named in-memory key-to-payload mapping.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<RequestKey, ResponsePayload>>,
}

impl MemoryStore {
    /// Number of entries, for assertions in tests.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn put(&self, key: &RequestKey, payload: ResponsePayload) -> Result<()> {
        self.entries.write().insert(key.clone(), payload);
        Ok(())
    }

    async fn put_all(&self, batch: Vec<(RequestKey, ResponsePayload)>) -> Result<()> {
        let mut entries = self.entries.write();
        for (key, payload) in batch {
            entries.insert(key, payload);
        }
        Ok(())
    }

    async fn match_key(
        &self,
        key: &RequestKey,
        options: MatchOptions,
    ) -> Result<Option<ResponsePayload>> {
        let entries = self.entries.read();
        if let Some(payload) = entries.get(key) {
            return Ok(Some(payload.clone()));
        }
        if options.ignore_query {
            let wanted = key.without_query();
            for (stored, payload) in entries.iter() {
                if stored.without_query() == wanted {
                    return Ok(Some(payload.clone()));
                }
            }
        }
        Ok(None)
    }
}
