// Lifecycle event bus: explicit registration seam between the engine and its host.

use std::sync::Arc;

use async_trait::async_trait;

use crate::engine::router::RouteOutcome;
use crate::error::CacheError;
use crate::store::traits::RequestKey;

/// The three lifecycle handlers a cache engine registers with its host.
/// The dispatching bus awaits each handler to completion, which is what
/// keeps the underlying event alive until the work settles.
#[async_trait]
pub trait EventHandlers: Send + Sync {
    async fn on_install(&self) -> Result<(), CacheError>;
    async fn on_activate(&self) -> Result<(), CacheError>;
    async fn on_fetch(&self, request: &RequestKey) -> Result<RouteOutcome, CacheError>;
}

/// Dispatch seam for hosting runtimes that deliver lifecycle events.
pub trait LifecycleBus {
    /// Register the handler set. A later registration replaces the earlier one.
    fn register(&mut self, handlers: Arc<dyn EventHandlers>);
}

/// In-process bus whose dispatch methods await the registered handlers
/// directly. With nothing registered, events pass through untouched.
#[derive(Default)]
pub struct LocalBus {
    handlers: Option<Arc<dyn EventHandlers>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn dispatch_install(&self) -> Result<(), CacheError> {
        match &self.handlers {
            Some(handlers) => handlers.on_install().await,
            None => Ok(()),
        }
    }

    pub async fn dispatch_activate(&self) -> Result<(), CacheError> {
        match &self.handlers {
            Some(handlers) => handlers.on_activate().await,
            None => Ok(()),
        }
    }

    pub async fn dispatch_fetch(&self, request: &RequestKey) -> Result<RouteOutcome, CacheError> {
        match &self.handlers {
            Some(handlers) => handlers.on_fetch(request).await,
            None => Ok(RouteOutcome::Passthrough),
        }
    }
}

impl LifecycleBus for LocalBus {
    fn register(&mut self, handlers: Arc<dyn EventHandlers>) {
        self.handlers = Some(handlers);
    }
}
