//! Per-client serialization points.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use traindesk_core::ClientId;

/// Registry of per-client mutexes.
///
/// The admissibility check and the paired writes of a check-in must not
/// interleave with another check-in for the same client; check-ins for
/// different clients proceed independently. Entries are created on demand
/// and kept for the process lifetime (the client roster is small).
#[derive(Debug, Default)]
pub struct ClientLocks {
    inner: Mutex<HashMap<ClientId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ClientLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the client's mutex; the caller locks it across the
    /// critical section.
    pub fn acquire(&self, client_id: &ClientId) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(client_id.clone()).or_default().clone()
    }
}
