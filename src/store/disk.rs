// Persistent store backend: one JSON document per store under a root directory.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use super::traits::{MatchOptions, RequestKey, ResponsePayload, Store, StoreBackend};

type Entries = Vec<(RequestKey, ResponsePayload)>;

/// Store backend persisting each store as `<name>.json` under `root`.
pub struct DiskBackend {
    root: PathBuf,
}

impl DiskBackend {
    /// Create a backend rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn store_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }
}

#[async_trait]
impl StoreBackend for DiskBackend {
    async fn open(&self, name: &str) -> Result<Arc<dyn Store>> {
        Ok(Arc::new(DiskStore {
            path: self.store_path(name),
            write_lock: Mutex::new(()),
        }))
    }

    async fn list_store_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete_store(&self, name: &str) -> Result<bool> {
        let path = self.store_path(name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("failed to delete store file {}", path.display()))?;
        Ok(true)
    }
}

/// One store file. The backing file is created on the first write; every
/// operation reads it fresh, so separate handles to the same name stay
/// coherent.
pub struct DiskStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl DiskStore {
    fn load(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read store file {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse store file {}", self.path.display()))
    }

    fn save(&self, entries: &Entries) -> Result<()> {
        let contents = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, contents)
            .with_context(|| format!("failed to write store file {}", self.path.display()))?;
        Ok(())
    }

    fn upsert(entries: &mut Entries, key: RequestKey, payload: ResponsePayload) {
        if let Some(slot) = entries.iter_mut().find(|(stored, _)| *stored == key) {
            slot.1 = payload;
        } else {
            entries.push((key, payload));
        }
    }
}

#[async_trait]
impl Store for DiskStore {
    async fn put(&self, key: &RequestKey, payload: ResponsePayload) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load()?;
        Self::upsert(&mut entries, key.clone(), payload);
        self.save(&entries)
    }

    async fn put_all(&self, batch: Vec<(RequestKey, ResponsePayload)>) -> Result<()> {
        // One load and one save, so the whole batch lands as a single write.
        let _guard = self.write_lock.lock();
        let mut entries = self.load()?;
        for (key, payload) in batch {
            Self::upsert(&mut entries, key, payload);
        }
        self.save(&entries)
    }

    async fn match_key(
        &self,
        key: &RequestKey,
        options: MatchOptions,
    ) -> Result<Option<ResponsePayload>> {
        let entries = self.load()?;
        if let Some((_, payload)) = entries.iter().find(|(stored, _)| stored == key) {
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
