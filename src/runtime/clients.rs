// Client-session control: how a newly installed version takes over running sessions.

use async_trait::async_trait;

/// Host collaborator deciding which engine version serves open sessions.
#[async_trait]
pub trait SessionControl: Send + Sync {
    /// Signal that this version should supersede a running older version
    /// immediately instead of waiting for its sessions to wind down.
    async fn supersede_waiting(&self);

    /// Make this version authoritative for sessions that are already open,
    /// without requiring them to reload.
    async fn claim_open_sessions(&self);
}

/// For hosts without session management; both signals are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSessionControl;

#[async_trait]
impl SessionControl for NoopSessionControl {
    async fn supersede_waiting(&self) {}
    async fn claim_open_sessions(&self) {}
}
