//! Test doubles and common utilities for architecture contract tests
//!
//! This module provides a fully scriptable platform probe and a recording
//! observer, so contract tests can stage platform behavior and assert on the
//! exact notification stream consumers would see.

use netwatch_core::{
    ActiveNetworkState, ConnectionType, ConnectivityNotifier, Error, NetworkCapabilities,
    NetworkId, NetworkObserver, NotifierConfig, NotifierHandle, PlatformProbe, ProbeEvent,
    ProbeEventSender, Result,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// One network in the scripted platform table.
#[derive(Clone)]
struct ScriptedNetwork {
    capabilities: NetworkCapabilities,
    vpn_accessible: bool,
}

/// A controlled platform probe that tests script explicitly
///
/// The probe answers queries from a mutable network table and pushes events
/// through the sender captured at subscription time. Mutators that end in an
/// event send mirror how a real platform announces the change; the `silently`
/// variants stage churn an unsubscribed notifier is supposed to miss.
pub struct ControlledProbe {
    active: Mutex<ActiveNetworkState>,
    networks: Mutex<HashMap<NetworkId, ScriptedNetwork>>,
    default_id: Mutex<Option<NetworkId>>,
    wifi_ssid: Mutex<Option<String>>,
    wifi_link_speed: Mutex<Option<u32>>,
    deny_subscribe: AtomicBool,
    fail_active: AtomicBool,
    subscribe_calls: AtomicUsize,
    unsubscribe_calls: AtomicUsize,
    event_tx: Mutex<Option<ProbeEventSender>>,
}

impl ControlledProbe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            active: Mutex::new(ActiveNetworkState::offline()),
            networks: Mutex::new(HashMap::new()),
            default_id: Mutex::new(None),
            wifi_ssid: Mutex::new(None),
            wifi_link_speed: Mutex::new(None),
            deny_subscribe: AtomicBool::new(false),
            fail_active: AtomicBool::new(false),
            subscribe_calls: AtomicUsize::new(0),
            unsubscribe_calls: AtomicUsize::new(0),
            event_tx: Mutex::new(None),
        })
    }

    /// Script the platform's default-network answer.
    pub fn set_active(&self, state: ActiveNetworkState) {
        *self.active.lock().unwrap() = state;
    }

    pub fn set_default_network(&self, id: Option<NetworkId>) {
        *self.default_id.lock().unwrap() = id;
    }

    /// Script the current WiFi association.
    pub fn set_wifi(&self, ssid: Option<&str>, link_speed_mbps: Option<u32>) {
        *self.wifi_ssid.lock().unwrap() = ssid.map(str::to_string);
        *self.wifi_link_speed.lock().unwrap() = link_speed_mbps;
    }

    /// Make subscription attempts fail (or succeed again).
    pub fn deny_subscription(&self, deny: bool) {
        self.deny_subscribe.store(deny, Ordering::SeqCst);
    }

    /// Make active-network queries fail (or succeed again).
    pub fn fail_active_query(&self, fail: bool) {
        self.fail_active.store(fail, Ordering::SeqCst);
    }

    /// Add a network to the platform table and announce it.
    pub fn add_network(
        &self,
        id: NetworkId,
        capabilities: NetworkCapabilities,
        vpn_accessible: bool,
    ) {
        self.insert_silently(id, capabilities, vpn_accessible);
        self.send(ProbeEvent::NetworkAvailable(id));
    }

    /// Remove a network from the platform table and announce the loss.
    pub fn remove_network(&self, id: NetworkId) {
        self.remove_silently(id);
        self.send(ProbeEvent::NetworkLost(id));
    }

    /// Edit the platform table without raising an event.
    pub fn insert_silently(
        &self,
        id: NetworkId,
        capabilities: NetworkCapabilities,
        vpn_accessible: bool,
    ) {
        self.networks.lock().unwrap().insert(
            id,
            ScriptedNetwork {
                capabilities,
                vpn_accessible,
            },
        );
    }

    pub fn remove_silently(&self, id: NetworkId) {
        self.networks.lock().unwrap().remove(&id);
    }

    /// Push a raw probe event, if a subscription is live.
    pub fn send(&self, event: ProbeEvent) {
        if let Some(tx) = self.event_tx.lock().unwrap().as_ref() {
            let _ = tx.send(event);
        }
    }

    /// Number of subscription attempts, including denied ones.
    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.unsubscribe_calls.load(Ordering::SeqCst)
    }

    pub fn has_live_subscription(&self) -> bool {
        self.event_tx.lock().unwrap().is_some()
    }
}

#[async_trait::async_trait]
impl PlatformProbe for ControlledProbe {
    async fn active_network_state(&self) -> Result<ActiveNetworkState> {
        if self.fail_active.load(Ordering::SeqCst) {
            return Err(Error::probe("scripted active-network outage"));
        }
        Ok(*self.active.lock().unwrap())
    }

    async fn all_network_ids(&self) -> Vec<NetworkId> {
        let mut ids: Vec<NetworkId> = self.networks.lock().unwrap().keys().copied().collect();
        ids.sort();
        ids
    }

    async fn network_capabilities(&self, id: NetworkId) -> Option<NetworkCapabilities> {
        self.networks
            .lock()
            .unwrap()
            .get(&id)
            .map(|network| network.capabilities.clone())
    }

    async fn is_vpn_accessible(&self, id: NetworkId) -> bool {
        self.networks
            .lock()
            .unwrap()
            .get(&id)
            .map(|network| network.vpn_accessible)
            .unwrap_or(false)
    }

    async fn default_network_id(&self) -> Option<NetworkId> {
        *self.default_id.lock().unwrap()
    }

    async fn wifi_link_speed_mbps(&self) -> Option<u32> {
        *self.wifi_link_speed.lock().unwrap()
    }

    async fn wifi_ssid(&self) -> Option<String> {
        self.wifi_ssid.lock().unwrap().clone()
    }

    async fn subscribe(&self, events: ProbeEventSender) -> Result<()> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        if self.deny_subscribe.load(Ordering::SeqCst) {
            return Err(Error::registration("platform denied the subscription"));
        }
        *self.event_tx.lock().unwrap() = Some(events);
        Ok(())
    }

    async fn unsubscribe(&self) {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        self.event_tx.lock().unwrap().take();
    }

    fn probe_name(&self) -> &'static str {
        "controlled"
    }
}

/// Recorded notification, in delivery order
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    TypeChanged(ConnectionType),
    BandwidthChanged(f64),
    Connected(NetworkId),
    SoonToDisconnect(NetworkId),
    Disconnected(NetworkId),
    Purged(Vec<NetworkId>),
}

/// An observer that records every notification it receives
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Recorded>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<Recorded> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    /// Drain only per-network roster notifications, dropping canonical state
    /// changes.
    pub fn take_roster(&self) -> Vec<Recorded> {
        self.take()
            .into_iter()
            .filter(|event| {
                !matches!(
                    event,
                    Recorded::TypeChanged(_) | Recorded::BandwidthChanged(_)
                )
            })
            .collect()
    }

    fn record(&self, event: Recorded) {
        self.events.lock().unwrap().push(event);
    }
}

impl NetworkObserver for RecordingObserver {
    fn on_connection_type_changed(&self, new_type: ConnectionType) {
        self.record(Recorded::TypeChanged(new_type));
    }

    fn on_max_bandwidth_changed(&self, max_bandwidth_mbps: f64) {
        self.record(Recorded::BandwidthChanged(max_bandwidth_mbps));
    }

    fn on_network_connected(&self, id: NetworkId, _connection_type: ConnectionType) {
        self.record(Recorded::Connected(id));
    }

    fn on_network_soon_to_disconnect(&self, id: NetworkId) {
        self.record(Recorded::SoonToDisconnect(id));
    }

    fn on_network_disconnected(&self, id: NetworkId) {
        self.record(Recorded::Disconnected(id));
    }

    fn on_network_list_purged(&self, active: &[NetworkId]) {
        self.record(Recorded::Purged(active.to_vec()));
    }
}

/// A notifier under test, with its probe, handle, and recording observer.
pub struct TestNotifier {
    pub probe: Arc<ControlledProbe>,
    pub handle: NotifierHandle,
    pub observer: Arc<RecordingObserver>,
    pub task: JoinHandle<Result<()>>,
}

/// Spawn a notifier over `probe` with a recording observer already attached,
/// and wait until startup has completed.
///
/// Startup emissions (the registration purge, any initial state change) are
/// left in the observer; tests that do not assert on them drain with
/// `take()` first.
pub async fn spawn_notifier(probe: Arc<ControlledProbe>, config: NotifierConfig) -> TestNotifier {
    let observer = Arc::new(RecordingObserver::new());
    let (notifier, handle) = ConnectivityNotifier::new(probe.clone(), config);
    handle.add_observer(observer.clone());

    let task = tokio::spawn(notifier.run());

    // flush() round-trips through the notifier task, and commands are only
    // serviced after startup, so startup is complete once it resolves.
    handle
        .flush()
        .await
        .expect("notifier task should be running");

    TestNotifier {
        probe,
        handle,
        observer,
        task,
    }
}
