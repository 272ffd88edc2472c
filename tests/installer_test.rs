// Install-phase behavior against an in-memory backend and a counting fake fetcher.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use offline_cache_engine::config::CacheConfig;
use offline_cache_engine::engine::installer::Installer;
use offline_cache_engine::manifest::AssetManifest;
use offline_cache_engine::runtime::clients::SessionControl;
use offline_cache_engine::source::traits::{FetchMode, NetworkFetch};
use offline_cache_engine::store::memory::MemoryBackend;
use offline_cache_engine::store::traits::{
    InspectableResponse, MatchOptions, OpaqueResponse, RequestKey, ResponsePayload, Store,
    StoreBackend,
};

/// Fake fetcher with canned bodies, configurable failures, and a call log.
#[derive(Default)]
struct FakeFetcher {
    responses: HashMap<String, Bytes>,
    fail: HashSet<String>,
    calls: Mutex<Vec<(String, FetchMode)>>,
}

impl FakeFetcher {
    fn respond(mut self, url: &str, body: &'static [u8]) -> Self {
        self.responses.insert(url.to_string(), Bytes::from_static(body));
        self
    }

    fn fail_on(mut self, url: &str) -> Self {
        self.fail.insert(url.to_string());
        self
    }

    fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().iter().filter(|(u, _)| u == url).count()
    }

    fn mode_for(&self, url: &str) -> Option<FetchMode> {
        self.calls
            .lock()
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, mode)| *mode)
    }
}

#[async_trait]
impl NetworkFetch for FakeFetcher {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<ResponsePayload> {
        self.calls.lock().push((url.to_string(), mode));
        if self.fail.contains(url) {
            return Err(anyhow!("connection refused: {url}"));
        }
        let body = self
            .responses
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("no canned response for {url}"))?;
        Ok(match mode {
            FetchMode::Inspectable => ResponsePayload::Inspectable(InspectableResponse {
                status: 200,
                headers: vec![("content-type".to_string(), "text/html".to_string())],
                body,
            }),
            FetchMode::Opaque => ResponsePayload::Opaque(OpaqueResponse::capture(body)),
        })
    }
}

#[derive(Default)]
struct RecordingSessions {
    superseded: AtomicBool,
    claimed: AtomicBool,
}

#[async_trait]
impl SessionControl for RecordingSessions {
    async fn supersede_waiting(&self) {
        self.superseded.store(true, Ordering::SeqCst);
    }

    async fn claim_open_sessions(&self) {
        self.claimed.store(true, Ordering::SeqCst);
    }
}

fn config() -> CacheConfig {
    CacheConfig {
        namespace: "app".to_string(),
        version: "v12".to_string(),
        origin: "http://localhost:8080".to_string(),
    }
}

fn manifest() -> AssetManifest {
    AssetManifest {
        required_local: vec!["/index.html".to_string()],
        best_effort_remote: vec!["https://cdn.example/lib.js".to_string()],
    }
}

#[tokio::test]
async fn test_install_populates_required_and_best_effort() {
    let backend = Arc::new(MemoryBackend::new());
    let fetcher = Arc::new(
        FakeFetcher::default()
            .respond("http://localhost:8080/index.html", b"<html>")
            .respond("https://cdn.example/lib.js", b"lib"),
    );
    let sessions = Arc::new(RecordingSessions::default());

    let installer = Installer::new(
        config(),
        manifest(),
        backend.clone(),
        fetcher.clone(),
        sessions.clone(),
    );
    installer.install().await.unwrap();

    let store = backend.open("app-v12").await.unwrap();
    let local = store
        .match_key(
            &RequestKey::get("http://localhost:8080/index.html"),
            MatchOptions::default(),
        )
        .await
        .unwrap();
    assert!(local.is_some());

    let remote = store
        .match_key(
            &RequestKey::get("https://cdn.example/lib.js"),
            MatchOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(
        remote,
        Some(ResponsePayload::Opaque(OpaqueResponse::capture(
            Bytes::from_static(b"lib")
        )))
    );

    // Local assets fetch with inspection rights, remote ones opaquely.
    assert_eq!(
        fetcher.mode_for("http://localhost:8080/index.html"),
        Some(FetchMode::Inspectable)
    );
    assert_eq!(
        fetcher.mode_for("https://cdn.example/lib.js"),
        Some(FetchMode::Opaque)
    );

    assert!(sessions.superseded.load(Ordering::SeqCst));
    assert!(!sessions.claimed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_required_failure_aborts_whole_install() {
    let backend = Arc::new(MemoryBackend::new());

    // A previous version's store that must survive the failed install.
    let old = backend.open("app-v11").await.unwrap();
    old.put(
        &RequestKey::get("http://localhost:8080/index.html"),
        ResponsePayload::Inspectable(InspectableResponse {
            status: 200,
            headers: vec![],
            body: Bytes::from_static(b"old"),
        }),
    )
    .await
    .unwrap();

    let fetcher = Arc::new(
        FakeFetcher::default()
            .respond("http://localhost:8080/index.html", b"<html>")
            .fail_on("http://localhost:8080/app.js")
            .respond("https://cdn.example/lib.js", b"lib"),
    );
    let sessions = Arc::new(RecordingSessions::default());

    let mut manifest = manifest();
    manifest.required_local.push("/app.js".to_string());

    let installer = Installer::new(
        config(),
        manifest,
        backend.clone(),
        fetcher.clone(),
        sessions.clone(),
    );
    let err = installer.install().await.unwrap_err();
    assert!(err.to_string().contains("required asset failed"));

    // The required batch is atomic: nothing was written, not even the
    // asset whose fetch succeeded.
    let store = backend.open("app-v12").await.unwrap();
    let survivor = store
        .match_key(
            &RequestKey::get("http://localhost:8080/index.html"),
            MatchOptions::default(),
        )
        .await
        .unwrap();
    assert!(survivor.is_none());

    // No supersession signal for a failed install.
    assert!(!sessions.superseded.load(Ordering::SeqCst));

    // The previous version's store is untouched.
    let old_entry = old
        .match_key(
            &RequestKey::get("http://localhost:8080/index.html"),
            MatchOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(
        old_entry,
        Some(ResponsePayload::Inspectable(InspectableResponse {
            status: 200,
            headers: vec![],
            body: Bytes::from_static(b"old"),
        }))
    );
}

#[tokio::test]
async fn test_best_effort_failure_is_logged_and_skipped() {
    // Required index.html succeeds, the CDN asset throws: install still
    // completes and the store holds index.html only.
    let backend = Arc::new(MemoryBackend::new());
    let fetcher = Arc::new(
        FakeFetcher::default()
            .respond("http://localhost:8080/index.html", b"<html>")
            .fail_on("https://cdn.example/lib.js"),
    );
    let sessions = Arc::new(RecordingSessions::default());

    let installer = Installer::new(
        config(),
        manifest(),
        backend.clone(),
        fetcher.clone(),
        sessions.clone(),
    );
    installer.install().await.unwrap();

    let store = backend.open("app-v12").await.unwrap();
    assert!(store
        .match_key(
            &RequestKey::get("http://localhost:8080/index.html"),
            MatchOptions::default(),
        )
        .await
        .unwrap()
        .is_some());
    assert!(store
        .match_key(
            &RequestKey::get("https://cdn.example/lib.js"),
            MatchOptions { ignore_query: true },
        )
        .await
        .unwrap()
        .is_none());

    // The failed CDN fetch was attempted exactly once and did not trigger
    // any retry.
    assert_eq!(fetcher.calls_for("https://cdn.example/lib.js"), 1);
    assert!(sessions.superseded.load(Ordering::SeqCst));
}
