// # Observer Registry
//
// Holds registered observers and fans a change out to each of them.
//
// Dispatch iterates a snapshot taken under the lock and released before any
// callback runs, so observers can add or remove observers (including
// themselves) from inside a callback without deadlock or iterator
// invalidation. An observer added mid-dispatch first sees the next change.

use std::sync::{Arc, Mutex};

use crate::state::NetworkChange;
use crate::traits::NetworkObserver;

/// Handle identifying one registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Default)]
struct Inner {
    observers: Vec<(ObserverId, Arc<dyn NetworkObserver>)>,
    next_id: u64,
}

/// Registry of connectivity observers.
#[derive(Default)]
pub struct ObserverRegistry {
    inner: Mutex<Inner>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. O(1) amortized.
    pub fn add(&self, observer: Arc<dyn NetworkObserver>) -> ObserverId {
        let mut inner = self.inner.lock().unwrap();
        let id = ObserverId(inner.next_id);
        inner.next_id += 1;
        inner.observers.push((id, observer));
        id
    }

    /// Remove an observer. Returns false when the id was never registered or
    /// was already removed.
    pub fn remove(&self, id: ObserverId) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.observers.len();
        inner.observers.retain(|(oid, _)| *oid != id);
        inner.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver one change to every observer registered at the start of the
    /// call, in registration order.
    pub fn dispatch(&self, change: &NetworkChange) {
        let snapshot: Vec<Arc<dyn NetworkObserver>> = {
            let inner = self.inner.lock().unwrap();
            inner
                .observers
                .iter()
                .map(|(_, observer)| Arc::clone(observer))
                .collect()
        };
        for observer in snapshot {
            match change {
                NetworkChange::ConnectionTypeChanged(new_type) => {
                    observer.on_connection_type_changed(*new_type);
                }
                NetworkChange::MaxBandwidthChanged(mbps) => {
                    observer.on_max_bandwidth_changed(*mbps);
                }
                NetworkChange::NetworkConnected {
                    id,
                    connection_type,
                } => {
                    observer.on_network_connected(*id, *connection_type);
                }
                NetworkChange::NetworkSoonToDisconnect { id } => {
                    observer.on_network_soon_to_disconnect(*id);
                }
                NetworkChange::NetworkDisconnected { id } => {
                    observer.on_network_disconnected(*id);
                }
                NetworkChange::NetworkListPurged { active } => {
                    observer.on_network_list_purged(active);
                }
            }
        }
    }
}
