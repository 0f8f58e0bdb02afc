// # Polling Platform Probe
//
// This crate provides an interval-polling `PlatformProbe` built on
// getifaddrs(3).
//
// ## Purpose
//
// This is a **fallback probe** for:
// - Unix platforms without an rtnetlink surface (macOS, BSD)
// - CI/CD testing
// - Debugging and validation
//
// ## IMPORTANT: Not Primary on Linux
//
// On Linux, **always prefer Netlink** (netwatch-probe-netlink) over
// polling. This probe is documented as non-primary and should only be used
// when Netlink is unavailable.
//
// ## Architecture
//
// Snapshots the interface table on a fixed interval and emits the
// `ConnectivityChanged` catch-all whenever the snapshot differs from the
// last one. No per-network push events are produced; the state machine
// re-queries and recomputes on every emit.

#[cfg(unix)]
use std::collections::BTreeMap;
#[cfg(unix)]
use std::io;
#[cfg(unix)]
use std::sync::Mutex;
#[cfg(unix)]
use std::time::Duration;

#[cfg(unix)]
use async_trait::async_trait;
#[cfg(unix)]
use nix::net::if_::InterfaceFlags;
#[cfg(unix)]
use tokio::task::JoinHandle;
#[cfg(unix)]
use tokio::time::MissedTickBehavior;
#[cfg(unix)]
use tracing::{debug, info, warn};

#[cfg(unix)]
use netwatch_core::traits::{PlatformProbe, ProbeEvent, ProbeEventSender};
#[cfg(unix)]
use netwatch_core::types::{ActiveNetworkState, NetworkCapabilities, NetworkId, Transport};
#[cfg(unix)]
use netwatch_core::{Error, Result};

/// Default polling interval.
#[cfg(unix)]
const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

/// Preference order when electing the active network from a snapshot.
/// Wired links are assumed to be the routed default when present.
#[cfg(unix)]
const ACTIVE_PRIORITY: [Transport; 6] = [
    Transport::Ethernet,
    Transport::Wifi,
    Transport::Cellular,
    Transport::Bluetooth,
    Transport::Vpn,
    Transport::Other,
];

/// One up-and-running, non-loopback interface as seen by getifaddrs.
#[cfg(unix)]
#[derive(Debug, Clone, PartialEq, Eq)]
struct InterfaceSnapshot {
    name: String,
    index: u32,
    transport: Transport,
    has_address: bool,
}

/// getifaddrs-based probe (fallback for platforms without netlink, or CI).
#[cfg(unix)]
pub struct PollProbe {
    poll_interval: Duration,
    worker: Mutex<Option<JoinHandle<()>>>,
}

#[cfg(unix)]
impl PollProbe {
    pub fn new() -> Self {
        Self::with_interval(Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS))
    }

    /// Create with custom polling interval
    pub fn with_interval(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            worker: Mutex::new(None),
        }
    }

    fn find_by_id(&self, id: NetworkId) -> Option<InterfaceSnapshot> {
        read_snapshot()
            .ok()?
            .into_iter()
            .find(|iface| iface.index == id.0)
    }
}

#[cfg(unix)]
impl Default for PollProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
#[async_trait]
impl PlatformProbe for PollProbe {
    async fn active_network_state(&self) -> Result<ActiveNetworkState> {
        let snapshot = read_snapshot()
            .map_err(|error| Error::probe(format!("getifaddrs failed: {error}")))?;
        Ok(match pick_active(&snapshot) {
            Some(iface) => ActiveNetworkState::online(iface.transport),
            None => ActiveNetworkState::offline(),
        })
    }

    async fn all_network_ids(&self) -> Vec<NetworkId> {
        read_snapshot()
            .unwrap_or_default()
            .into_iter()
            .map(|iface| NetworkId(iface.index))
            .collect()
    }

    async fn network_capabilities(&self, id: NetworkId) -> Option<NetworkCapabilities> {
        let iface = self.find_by_id(id)?;
        // An addressless interface is up but cannot carry traffic yet.
        Some(match iface.transport {
            Transport::Vpn => NetworkCapabilities::new(vec![Transport::Vpn], iface.has_address),
            transport => NetworkCapabilities::new(vec![transport], iface.has_address),
        })
    }

    async fn is_vpn_accessible(&self, _id: NetworkId) -> bool {
        // One routing domain per host: a visible tunnel serves every
        // process.
        true
    }

    async fn default_network_id(&self) -> Option<NetworkId> {
        let snapshot = read_snapshot().ok()?;
        pick_active(&snapshot).map(|iface| NetworkId(iface.index))
    }

    async fn wifi_link_speed_mbps(&self) -> Option<u32> {
        // getifaddrs exposes no radio information.
        None
    }

    async fn wifi_ssid(&self) -> Option<String> {
        None
    }

    async fn subscribe(&self, events: ProbeEventSender) -> Result<()> {
        let mut last = read_snapshot()
            .map_err(|error| Error::registration(format!("getifaddrs failed: {error}")))?;
        let poll_interval = self.poll_interval;
        let worker = tokio::spawn(async move {
            info!(
                interval_secs = poll_interval.as_secs(),
                "starting interface polling"
            );
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let current = match read_snapshot() {
                    Ok(snapshot) => snapshot,
                    Err(error) => {
                        warn!(%error, "interface snapshot failed");
                        continue;
                    }
                };
                if current != last {
                    let names: Vec<&str> =
                        current.iter().map(|iface| iface.name.as_str()).collect();
                    debug!(interfaces = ?names, "interface table changed");
                    if events.send(ProbeEvent::ConnectivityChanged).is_err() {
                        debug!("event receiver gone, stopping poll worker");
                        break;
                    }
                    last = current;
                }
            }
        });
        if let Some(stale) = self.worker.lock().unwrap().replace(worker) {
            stale.abort();
        }
        Ok(())
    }

    async fn unsubscribe(&self) {
        if let Some(worker) = self.worker.lock().unwrap().take() {
            worker.abort();
        }
    }

    fn probe_name(&self) -> &'static str {
        "poll"
    }
}

/// Collapse getifaddrs entries (one per address family) into one record per
/// up-and-running, non-loopback interface.
#[cfg(unix)]
fn read_snapshot() -> io::Result<Vec<InterfaceSnapshot>> {
    let entries = nix::ifaddrs::getifaddrs().map_err(io::Error::from)?;
    let mut by_name: BTreeMap<String, InterfaceSnapshot> = BTreeMap::new();
    for entry in entries {
        let flags = entry.flags;
        if flags.contains(InterfaceFlags::IFF_LOOPBACK)
            || !flags.contains(InterfaceFlags::IFF_UP)
            || !flags.contains(InterfaceFlags::IFF_RUNNING)
        {
            continue;
        }
        let has_address = entry
            .address
            .as_ref()
            .is_some_and(|addr| addr.as_sockaddr_in().is_some() || addr.as_sockaddr_in6().is_some());
        let index = match nix::net::if_::if_nametoindex(entry.interface_name.as_str()) {
            Ok(index) => index,
            Err(_) => continue, // raced with interface removal
        };
        let snapshot = by_name
            .entry(entry.interface_name.clone())
            .or_insert_with(|| InterfaceSnapshot {
                transport: classify_by_name(&entry.interface_name),
                name: entry.interface_name.clone(),
                index,
                has_address: false,
            });
        snapshot.has_address |= has_address;
    }
    Ok(by_name.into_values().collect())
}

/// Elect the interface most likely to be the routed default: best transport
/// first, and only interfaces that actually hold an address.
#[cfg(unix)]
fn pick_active(snapshot: &[InterfaceSnapshot]) -> Option<&InterfaceSnapshot> {
    ACTIVE_PRIORITY.iter().find_map(|wanted| {
        snapshot
            .iter()
            .find(|iface| iface.has_address && iface.transport == *wanted)
    })
}

/// Without sysfs there is nothing but kernel naming conventions to go on.
#[cfg(unix)]
fn classify_by_name(name: &str) -> Transport {
    const PREFIXES: &[(&str, Transport)] = &[
        ("wl", Transport::Wifi),
        ("ww", Transport::Cellular),
        ("rmnet", Transport::Cellular),
        ("tun", Transport::Vpn),
        ("tap", Transport::Vpn),
        ("wg", Transport::Vpn),
        ("ppp", Transport::Vpn),
        ("utun", Transport::Vpn),
        ("bnep", Transport::Bluetooth),
        ("en", Transport::Ethernet),
        ("eth", Transport::Ethernet),
    ];
    PREFIXES
        .iter()
        .find(|(prefix, _)| name.starts_with(prefix))
        .map(|(_, transport)| *transport)
        .unwrap_or(Transport::Other)
}
