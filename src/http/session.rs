//! Session lifecycle signaling
//!
//! When a refresh cycle fails the session is void: credentials are cleared
//! and every collaborator needs to know. The client publishes that on a
//! broadcast channel; the embedding application subscribes and routes the
//! user to its login entry point.

use tokio::sync::broadcast;

/// Session lifecycle events published by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session can no longer be refreshed; stored credentials were
    /// cleared and the user must log in again
    Invalidated,
}

/// Broadcast hub for session events
#[derive(Debug, Clone)]
pub(crate) struct SessionHub {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionHub {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Subscribe to session events
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Publish a session invalidation; a send with no subscribers is fine
    pub(crate) fn invalidate(&self) {
        let _ = self.tx.send(SessionEvent::Invalidated);
    }
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}
