use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use super::types::{ParamsPatch, SessionPatch, SessionState};

/// Observable holder of the current [`SessionState`].
///
/// Snapshots are immutable `Arc`s. Mutators are synchronous and total; they
/// perform no validation. Each mutation publishes a new snapshot to every
/// subscriber.
pub struct SessionStore {
    tx: watch::Sender<Arc<SessionState>>,
}

impl SessionStore {
    /// Create a store seeded with default values.
    pub fn new() -> Self {
        Self::with_state(SessionState::default())
    }

    pub fn with_state(state: SessionState) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(state));
        Self { tx }
    }

    /// Current snapshot.
    pub fn get(&self) -> Arc<SessionState> {
        self.tx.borrow().clone()
    }

    /// Receive a notification for every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
        self.tx.subscribe()
    }

    /// Shallow-merge top-level fields.
    pub fn patch(&self, patch: SessionPatch) {
        self.tx.send_modify(|current| {
            let mut next = SessionState::clone(current);
            patch.apply_to(&mut next);
            *current = Arc::new(next);
        });
    }

    /// Shallow-merge only the `params` sub-record.
    pub fn patch_params(&self, patch: ParamsPatch) {
        if patch.is_empty() {
            debug!("Ignoring empty params patch");
            return;
        }
        self.tx.send_modify(|current| {
            let mut next = SessionState::clone(current);
            next.params = Arc::new(next.params.merged(&patch));
            *current = Arc::new(next);
        });
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
