//! Active participant registry.
//!
//! Maps identity → [`SessionHandle`]. Reads (broadcasts, lookups) run
//! concurrently; register/unregister take the write lock briefly.

use crate::state::SessionHandle;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Registry of active sessions keyed by identity.
#[derive(Debug, Default)]
pub struct Registry {
    pub(super) sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the session registered under `handle.identity()`.
    ///
    /// Returns the handle that was replaced, if any.
    pub fn register(&self, handle: Arc<SessionHandle>) -> Option<Arc<SessionHandle>> {
        let identity = handle.identity().to_string();
        let uid = handle.uid().to_string();
        let replaced = self.sessions.write().insert(identity.clone(), handle);

        match &replaced {
            Some(old) => info!(
                identity = %identity,
                uid = %uid,
                replaced_uid = %old.uid(),
                "Identity re-registered, previous session replaced"
            ),
            None => debug!(identity = %identity, uid = %uid, "Session registered"),
        }
        replaced
    }

    /// Remove `identity` whoever owns it. Idempotent.
    ///
    /// Connections never call this on their way out: they use
    /// [`Registry::unregister_session`], which leaves a newer owner of the
    /// identity in place.
    #[allow(dead_code)] // Administrative removal, used by tests
    pub fn unregister(&self, identity: &str) -> Option<Arc<SessionHandle>> {
        self.remove_if(identity, |_| true)
    }

    /// Remove `identity` only if it still belongs to connection `uid`.
    pub fn unregister_session(&self, identity: &str, uid: &str) -> Option<Arc<SessionHandle>> {
        self.remove_if(identity, |current| current.uid() == uid)
    }

    fn remove_if(
        &self,
        identity: &str,
        owned: impl FnOnce(&SessionHandle) -> bool,
    ) -> Option<Arc<SessionHandle>> {
        let mut sessions = self.sessions.write();
        let current = sessions.get(identity)?;
        if !owned(current) {
            debug!(
                identity = %identity,
                current_uid = %current.uid(),
                "Stale session not unregistered"
            );
            return None;
        }

        let removed = sessions.remove(identity);
        if let Some(handle) = &removed {
            debug!(identity = %identity, uid = %handle.uid(), "Session unregistered");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    #[allow(dead_code)] // Diagnostics, used by tests
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    #[allow(dead_code)] // Diagnostics, used by tests
    pub fn contains(&self, identity: &str) -> bool {
        self.sessions.read().contains_key(identity)
    }

    /// Registered identities, sorted.
    #[allow(dead_code)] // Diagnostics, used by tests
    pub fn identities(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sessions.read().keys().cloned().collect();
        names.sort();
        names
    }
}
