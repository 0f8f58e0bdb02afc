// # Platform Probe Trait
//
// Capability interface over the operating system's connectivity surface.
//
// ## Implementations
//
// - Linux rtnetlink: `netwatch-probe-netlink` crate
// - Portable polling fallback: `netwatch-probe-poll` crate
// - Tests use controllable mocks
//
// A single interface hides whether the platform delivers broadcast-style
// catch-all notifications or per-network callbacks: probes with only a crude
// signal emit `ProbeEvent::ConnectivityChanged`, richer platforms emit the
// per-network variants, and the state machine handles both.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::types::{ActiveNetworkState, NetworkCapabilities, NetworkId};

/// Push notification from the platform.
///
/// Probes send these from whatever thread the OS invokes them on; the sender
/// half of an unbounded channel is the marshaling boundary onto the notifier
/// task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    /// A network became available for use.
    NetworkAvailable(NetworkId),
    /// A network is about to go away.
    NetworkLosing {
        id: NetworkId,
        ms_until_loss: u64,
    },
    /// A network disconnected.
    NetworkLost(NetworkId),
    /// A network's capabilities changed (transports, internet access).
    CapabilitiesChanged(NetworkId),
    /// Legacy broadcast-style catch-all: something about connectivity
    /// changed, re-query and recompute.
    ConnectivityChanged,
    /// Signal strength changed; bandwidth estimates may be stale.
    SignalStrengthChanged,
}

/// Sender half handed to a probe at subscription time.
pub type ProbeEventSender = mpsc::UnboundedSender<ProbeEvent>;

/// Capability interface for a platform's connectivity surface.
///
/// # Query contract
///
/// All queries are cheap, non-blocking reads of platform state. A query that
/// cannot be answered degrades (`Err`, `None`, or empty) rather than
/// blocking; the state machine maps degraded answers to safe defaults and
/// never propagates them to consumers as errors.
///
/// # Subscription contract
///
/// `subscribe` starts push delivery into the given sender and may fail if
/// the platform denies the resources (the caller stays unregistered and may
/// retry later). `unsubscribe` stops delivery. The caller guarantees the two
/// are called in pairs; implementations do not need to tolerate double
/// subscription. Events already queued when `unsubscribe` lands are dropped
/// by the receiver, so late sends are harmless.
#[async_trait]
pub trait PlatformProbe: Send + Sync {
    /// The platform's view of its distinguished default network.
    async fn active_network_state(&self) -> crate::Result<ActiveNetworkState>;

    /// All networks the platform currently considers connected, unfiltered.
    async fn all_network_ids(&self) -> Vec<NetworkId>;

    /// Capability summary for one network, or `None` when the network is
    /// gone or cannot be classified.
    async fn network_capabilities(&self, id: NetworkId) -> Option<NetworkCapabilities>;

    /// For VPN networks, whether this process can route traffic through it.
    async fn is_vpn_accessible(&self, id: NetworkId) -> bool;

    /// Id of the default network, when the platform distinguishes one.
    async fn default_network_id(&self) -> Option<NetworkId>;

    /// Link speed of the current WiFi association in Mbps, when known.
    async fn wifi_link_speed_mbps(&self) -> Option<u32>;

    /// SSID of the current WiFi association, when known.
    async fn wifi_ssid(&self) -> Option<String>;

    /// Start pushing events into `events`.
    async fn subscribe(&self, events: ProbeEventSender) -> crate::Result<()>;

    /// Stop pushing events.
    async fn unsubscribe(&self);

    /// Short name for logging (e.g. "netlink", "poll").
    fn probe_name(&self) -> &'static str;
}
