// Versioned offline-asset cache engine: cache-first request routing with network fallback.

pub mod config;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod runtime;
pub mod source;
pub mod store;

use std::sync::Once;

use tracing::info;
use tracing_subscriber::EnvFilter;

static INIT_TRACING: Once = Once::new();

/// Install a default tracing subscriber for embedders that have none of
/// their own. Safe to call more than once.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();

        info!("cache engine tracing initialized");
    });
}
