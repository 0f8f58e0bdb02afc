// # Network Observer Trait
//
// Consumer interface for connectivity notifications.

use crate::types::{ConnectionType, NetworkId};

/// Observer of connectivity changes.
///
/// All methods default to no-ops so implementations override only what they
/// care about.
///
/// # Delivery
///
/// Callbacks run synchronously on the notifier task, one observer at a time,
/// at most once per change. A slow callback delays every later delivery, so
/// observers should hand work off rather than block. Observers may add or
/// remove observers (including themselves) from within a callback.
///
/// # Panics
///
/// Panics are not caught: a panicking observer unwinds the notifier task,
/// after which handle operations return [`crate::Error::NotifierStopped`].
pub trait NetworkObserver: Send + Sync {
    /// The canonical connection type changed, or the WiFi SSID changed while
    /// the type stayed WiFi.
    fn on_connection_type_changed(&self, new_type: ConnectionType) {
        let _ = new_type;
    }

    /// The maximum bandwidth estimate changed, or the connection type
    /// changed (an equal figure is republished alongside a type change).
    fn on_max_bandwidth_changed(&self, max_bandwidth_mbps: f64) {
        let _ = max_bandwidth_mbps;
    }

    /// A network joined the roster.
    fn on_network_connected(&self, id: NetworkId, connection_type: ConnectionType) {
        let _ = (id, connection_type);
    }

    /// A tracked network reported it will disconnect soon.
    fn on_network_soon_to_disconnect(&self, id: NetworkId) {
        let _ = id;
    }

    /// A tracked network disconnected.
    fn on_network_disconnected(&self, id: NetworkId) {
        let _ = id;
    }

    /// The set of usable networks was replaced wholesale; `active` is the
    /// complete new list. Sent on registration and when an accessible VPN
    /// takes over.
    fn on_network_list_purged(&self, active: &[NetworkId]) {
        let _ = active;
    }
}
