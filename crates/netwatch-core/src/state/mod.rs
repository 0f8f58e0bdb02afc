// # Connectivity State Machine
//
// Canonicalizes platform probe signals into a small connectivity state and a
// stream of observer-facing changes.
//
// ## Responsibilities
//
// - Roster of concurrently-connected networks, keyed by platform id
// - VPN precedence: an accessible VPN collapses the canonical view to the
//   VPN alone; its loss replays the surviving roster
// - Duplicate suppression: recomputes publish only on value inequality with
//   the last published state
// - Bandwidth estimation from transport, cellular subtype, and WiFi link
//   speed
//
// The machine is single-threaded by construction: the notifier task is the
// only caller, so no field needs a lock. Methods return the changes to fan
// out instead of invoking observers themselves, which keeps the machine
// directly testable.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::traits::{PlatformProbe, ProbeEvent};
use crate::types::{
    ActiveNetworkState, CanonicalState, CellularSubtype, ConnectionType, NetworkDescriptor,
    NetworkId, Transport,
};

/// Observer-facing change produced by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkChange {
    /// Canonical connection type changed (or the WiFi SSID changed while the
    /// type stayed WiFi).
    ConnectionTypeChanged(ConnectionType),
    /// Bandwidth estimate changed, or the type changed and the figure is
    /// republished.
    MaxBandwidthChanged(f64),
    NetworkConnected {
        id: NetworkId,
        connection_type: ConnectionType,
    },
    NetworkSoonToDisconnect {
        id: NetworkId,
    },
    NetworkDisconnected {
        id: NetworkId,
    },
    /// The usable-network list was replaced wholesale.
    NetworkListPurged {
        active: Vec<NetworkId>,
    },
}

/// Roster and canonical-state tracker.
pub struct ConnectivityStateMachine {
    probe: Arc<dyn PlatformProbe>,
    roster: HashMap<NetworkId, NetworkDescriptor>,
    published: CanonicalState,
}

impl ConnectivityStateMachine {
    pub fn new(probe: Arc<dyn PlatformProbe>) -> Self {
        Self {
            probe,
            roster: HashMap::new(),
            published: CanonicalState::offline(),
        }
    }

    /// The last published canonical state.
    pub fn published(&self) -> &CanonicalState {
        &self.published
    }

    /// Usable networks in ascending id order. While an accessible VPN is
    /// present the list collapses to the VPN alone, since no other network
    /// can carry this process's traffic.
    pub fn roster_snapshot(&self) -> Vec<NetworkDescriptor> {
        self.usable_descriptors()
    }

    pub fn clear_roster(&mut self) {
        self.roster.clear();
    }

    /// Registration-denied path: forget everything and report offline
    /// through the normal dedup gate.
    pub fn reset_offline(&mut self) -> Vec<NetworkChange> {
        self.roster.clear();
        self.diff_and_publish(CanonicalState::offline())
    }

    /// Registration-time resync: rebuild the roster from the probe's
    /// enumeration, announce it as a purge, then recompute. The purge is the
    /// first thing observers receive after a registration.
    pub async fn resync(&mut self) -> Vec<NetworkChange> {
        self.roster.clear();
        for id in self.probe.all_network_ids().await {
            if let Some(descriptor) = self.query_descriptor(id).await {
                self.roster.insert(id, descriptor);
            }
        }
        let mut changes = vec![NetworkChange::NetworkListPurged {
            active: self.usable_ids(),
        }];
        changes.extend(self.refresh().await);
        changes
    }

    /// Process one marshaled probe event.
    pub async fn handle_event(&mut self, event: ProbeEvent) -> Vec<NetworkChange> {
        match event {
            ProbeEvent::NetworkAvailable(id) | ProbeEvent::CapabilitiesChanged(id) => {
                let mut changes = self.upsert_network(id).await;
                changes.extend(self.refresh().await);
                changes
            }
            ProbeEvent::NetworkLosing { id, ms_until_loss } => self.on_losing(id, ms_until_loss),
            ProbeEvent::NetworkLost(id) => {
                let mut changes = self.on_lost(id);
                changes.extend(self.refresh().await);
                changes
            }
            ProbeEvent::ConnectivityChanged | ProbeEvent::SignalStrengthChanged => {
                self.refresh().await
            }
        }
    }

    /// Recompute canonical state and publish only if it actually changed.
    pub async fn refresh(&mut self) -> Vec<NetworkChange> {
        let next = self.compute_canonical().await;
        self.diff_and_publish(next)
    }

    /// Available and capabilities-changed share one idempotent upsert: an
    /// unchanged re-announcement is silent, a changed descriptor re-emits
    /// the connect. A tracked network whose re-query no longer classifies
    /// it as an internet bearer leaves the roster the way it would have
    /// been ignored on first sight: silently.
    async fn upsert_network(&mut self, id: NetworkId) -> Vec<NetworkChange> {
        let Some(descriptor) = self.query_descriptor(id).await else {
            if self.roster.remove(&id).is_some() {
                debug!(%id, "network is no longer an internet bearer, dropped");
            } else {
                debug!(%id, "network unclassifiable or gone, not tracking");
            }
            return Vec::new();
        };
        let previous = self.roster.insert(id, descriptor.clone());
        if previous.as_ref() == Some(&descriptor) {
            return Vec::new();
        }
        if descriptor.suppressed() {
            debug!(%id, "tracking inaccessible vpn silently");
            return Vec::new();
        }
        let mut changes = vec![NetworkChange::NetworkConnected {
            id,
            connection_type: descriptor.connection_type(),
        }];
        if descriptor.is_accessible_vpn() {
            // The VPN supersedes everything else that was usable.
            changes.push(NetworkChange::NetworkListPurged { active: vec![id] });
        }
        changes
    }

    fn on_losing(&self, id: NetworkId, ms_until_loss: u64) -> Vec<NetworkChange> {
        match self.roster.get(&id) {
            Some(descriptor) if !descriptor.suppressed() => {
                debug!(%id, ms_until_loss, "network going away soon");
                vec![NetworkChange::NetworkSoonToDisconnect { id }]
            }
            _ => Vec::new(),
        }
    }

    /// Idempotent removal. A lost event for an untracked id is a no-op; a
    /// suppressed VPN still gets its bare disconnect, since its capabilities
    /// can no longer be queried to filter it.
    fn on_lost(&mut self, id: NetworkId) -> Vec<NetworkChange> {
        let Some(descriptor) = self.roster.remove(&id) else {
            debug!(%id, "lost event for untracked network ignored");
            return Vec::new();
        };
        let mut changes = vec![NetworkChange::NetworkDisconnected { id }];
        if descriptor.is_accessible_vpn() {
            // Consumers rebuilt their world around the VPN; replay the
            // surviving networks so they can resync.
            for entry in self.usable_descriptors() {
                changes.push(NetworkChange::NetworkConnected {
                    id: entry.id,
                    connection_type: entry.connection_type(),
                });
            }
        }
        changes
    }

    async fn query_descriptor(&self, id: NetworkId) -> Option<NetworkDescriptor> {
        let capabilities = self.probe.network_capabilities(id).await?;
        if !capabilities.has_internet {
            return None;
        }
        let is_vpn = capabilities.has_transport(Transport::Vpn);
        let vpn_accessible = if is_vpn {
            self.probe.is_vpn_accessible(id).await
        } else {
            false
        };
        Some(NetworkDescriptor {
            id,
            transport: capabilities.primary_transport(),
            is_vpn,
            vpn_accessible,
        })
    }

    /// Canonical derivation, in precedence order: accessible VPN, the
    /// platform's active network, the default id resolved into the roster,
    /// any visible roster entry, offline.
    async fn compute_canonical(&self) -> CanonicalState {
        if self.accessible_vpn().is_some() {
            return CanonicalState {
                connection_type: ConnectionType::Vpn,
                max_bandwidth_mbps: f64::INFINITY,
                wifi_ssid: None,
            };
        }

        let active = match self.probe.active_network_state().await {
            Ok(state) => state,
            Err(error) => {
                debug!(%error, "active network query failed, treating as offline");
                ActiveNetworkState::offline()
            }
        };
        if active.exists {
            let connection_type = active.transport.connection_type(active.subtype);
            let max_bandwidth_mbps = self.bandwidth_for(active.transport, active.subtype).await;
            let wifi_ssid = if connection_type == ConnectionType::Wifi {
                self.probe.wifi_ssid().await
            } else {
                None
            };
            return CanonicalState {
                connection_type,
                max_bandwidth_mbps,
                wifi_ssid,
            };
        }

        if let Some(id) = self.probe.default_network_id().await {
            if let Some(descriptor) = self.roster.get(&id) {
                if !descriptor.suppressed() {
                    return self.fallback_state(descriptor).await;
                }
            }
        }
        if let Some(descriptor) = self.usable_descriptors().into_iter().next() {
            return self.fallback_state(&descriptor).await;
        }
        CanonicalState::offline()
    }

    /// Canonical state derived from a roster entry alone, with no per-network
    /// subtype knowledge.
    async fn fallback_state(&self, descriptor: &NetworkDescriptor) -> CanonicalState {
        let connection_type = descriptor.connection_type();
        let max_bandwidth_mbps = self
            .bandwidth_for(descriptor.transport, CellularSubtype::Unknown)
            .await;
        let wifi_ssid = if connection_type == ConnectionType::Wifi {
            self.probe.wifi_ssid().await
        } else {
            None
        };
        CanonicalState {
            connection_type,
            max_bandwidth_mbps,
            wifi_ssid,
        }
    }

    async fn bandwidth_for(&self, transport: Transport, subtype: CellularSubtype) -> f64 {
        match transport {
            Transport::Wifi => match self.probe.wifi_link_speed_mbps().await {
                Some(mbps) => f64::from(mbps),
                None => f64::INFINITY,
            },
            Transport::Cellular => subtype.max_bandwidth_mbps(),
            _ => f64::INFINITY,
        }
    }

    fn diff_and_publish(&mut self, next: CanonicalState) -> Vec<NetworkChange> {
        let type_changed = next.connection_type != self.published.connection_type;
        let ssid_changed = next.wifi_ssid != self.published.wifi_ssid;
        let bandwidth_changed = next.max_bandwidth_mbps != self.published.max_bandwidth_mbps;

        let mut changes = Vec::new();
        if type_changed || ssid_changed {
            changes.push(NetworkChange::ConnectionTypeChanged(next.connection_type));
        }
        // A type change republishes the bandwidth figure even when equal.
        if bandwidth_changed || type_changed {
            changes.push(NetworkChange::MaxBandwidthChanged(next.max_bandwidth_mbps));
        }
        if !changes.is_empty() {
            debug!(
                from = %self.published.connection_type,
                to = %next.connection_type,
                bandwidth = next.max_bandwidth_mbps,
                "canonical connectivity changed"
            );
            self.published = next;
        }
        changes
    }

    fn accessible_vpn(&self) -> Option<&NetworkDescriptor> {
        self.roster.values().find(|d| d.is_accessible_vpn())
    }

    fn usable_descriptors(&self) -> Vec<NetworkDescriptor> {
        if let Some(vpn) = self.accessible_vpn() {
            // All traffic routes through the VPN, so nothing else is usable.
            return vec![vpn.clone()];
        }
        let mut entries: Vec<NetworkDescriptor> = self
            .roster
            .values()
            .filter(|d| !d.suppressed())
            .cloned()
            .collect();
        entries.sort_by_key(|d| d.id);
        entries
    }

    fn usable_ids(&self) -> Vec<NetworkId> {
        self.usable_descriptors().into_iter().map(|d| d.id).collect()
    }
}
