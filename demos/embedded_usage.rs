//! Minimal embedding example for netwatch-core
//!
//! This example demonstrates using netwatch-core as a library in a custom
//! application, driving the engine from a scripted platform probe instead of
//! a real one. The notifier lifecycle is fully managed by the application.

#![allow(dead_code)]

use netwatch_core::{
    ActiveNetworkState, ApplicationState, ConnectionType, ConnectivityNotifier,
    NetworkCapabilities, NetworkId, NetworkObserver, NotifierConfig, PlatformProbe, ProbeEvent,
    ProbeEventSender, Result, Transport,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Scripted platform probe for embedded usage
///
/// Holds a mutable network table the scenario edits between steps. A real
/// embedder would bridge their platform's notification API here instead.
struct ScriptedProbe {
    active: Mutex<ActiveNetworkState>,
    networks: Mutex<HashMap<NetworkId, NetworkCapabilities>>,
    default_id: Mutex<Option<NetworkId>>,
    event_tx: Mutex<Option<ProbeEventSender>>,
}

impl ScriptedProbe {
    fn new() -> Self {
        Self {
            active: Mutex::new(ActiveNetworkState::offline()),
            networks: Mutex::new(HashMap::new()),
            default_id: Mutex::new(None),
            event_tx: Mutex::new(None),
        }
    }

    /// Change what the platform reports as its default network.
    fn set_active(&self, state: ActiveNetworkState, default_id: Option<NetworkId>) {
        *self.active.lock().unwrap() = state;
        *self.default_id.lock().unwrap() = default_id;
    }

    /// Bring a network up and notify the engine.
    fn connect(&self, id: NetworkId, capabilities: NetworkCapabilities) {
        self.networks.lock().unwrap().insert(id, capabilities);
        self.send(ProbeEvent::NetworkAvailable(id));
    }

    /// Take a network down and notify the engine.
    fn disconnect(&self, id: NetworkId) {
        self.networks.lock().unwrap().remove(&id);
        self.send(ProbeEvent::NetworkLost(id));
    }

    fn send(&self, event: ProbeEvent) {
        if let Some(tx) = self.event_tx.lock().unwrap().as_ref() {
            let _ = tx.send(event);
        }
    }
}

#[async_trait::async_trait]
impl PlatformProbe for ScriptedProbe {
    async fn active_network_state(&self) -> Result<ActiveNetworkState> {
        Ok(*self.active.lock().unwrap())
    }

    async fn all_network_ids(&self) -> Vec<NetworkId> {
        let mut ids: Vec<NetworkId> = self.networks.lock().unwrap().keys().copied().collect();
        ids.sort();
        ids
    }

    async fn network_capabilities(&self, id: NetworkId) -> Option<NetworkCapabilities> {
        self.networks.lock().unwrap().get(&id).cloned()
    }

    async fn is_vpn_accessible(&self, _id: NetworkId) -> bool {
        true
    }

    async fn default_network_id(&self) -> Option<NetworkId> {
        *self.default_id.lock().unwrap()
    }

    async fn wifi_link_speed_mbps(&self) -> Option<u32> {
        Some(120)
    }

    async fn wifi_ssid(&self) -> Option<String> {
        Some("demo-ap".to_string())
    }

    async fn subscribe(&self, events: ProbeEventSender) -> Result<()> {
        *self.event_tx.lock().unwrap() = Some(events);
        Ok(())
    }

    async fn unsubscribe(&self) {
        self.event_tx.lock().unwrap().take();
    }

    fn probe_name(&self) -> &'static str {
        "scripted"
    }
}

/// Observer that prints every notification
struct PrintingObserver;

impl NetworkObserver for PrintingObserver {
    fn on_connection_type_changed(&self, new_type: ConnectionType) {
        println!("[Observer] connection type -> {new_type}");
    }

    fn on_max_bandwidth_changed(&self, max_bandwidth_mbps: f64) {
        println!("[Observer] max bandwidth -> {max_bandwidth_mbps} Mbps");
    }

    fn on_network_connected(&self, id: NetworkId, connection_type: ConnectionType) {
        println!("[Observer] network {id} connected ({connection_type})");
    }

    fn on_network_soon_to_disconnect(&self, id: NetworkId) {
        println!("[Observer] network {id} going away soon");
    }

    fn on_network_disconnected(&self, id: NetworkId) {
        println!("[Observer] network {id} disconnected");
    }

    fn on_network_list_purged(&self, active: &[NetworkId]) {
        println!("[Observer] network list purged, active: {active:?}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Show the engine's own tracing output alongside the scenario
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== Embedded netwatch-core Example ===\n");

    // Create the scripted probe and the notifier around it
    let probe = Arc::new(ScriptedProbe::new());

    println!("1. Creating notifier...");
    let (notifier, handle) = ConnectivityNotifier::new(probe.clone(), NotifierConfig::new());
    handle.add_observer(Arc::new(PrintingObserver));

    // Run the notifier in the background
    println!("2. Starting notifier in background...");
    let notifier_task = tokio::spawn(notifier.run());

    // flush() round-trips through the engine task, so startup registration
    // has completed once it returns
    handle.flush().await?;
    println!(
        "   registered: {}, online: {}, type: {}",
        handle.is_registered(),
        handle.is_online(),
        handle.current_connection_type()
    );

    println!("\n3. WiFi appears...");
    probe.set_active(ActiveNetworkState::online(Transport::Wifi), Some(NetworkId(1)));
    probe.connect(NetworkId(1), NetworkCapabilities::single(Transport::Wifi));
    handle.flush().await?;
    println!(
        "   online: {}, type: {}, bandwidth: {} Mbps",
        handle.is_online(),
        handle.current_connection_type(),
        handle.current_max_bandwidth_mbps()
    );

    println!("\n4. VPN comes up over the WiFi...");
    probe.connect(NetworkId(2), NetworkCapabilities::vpn_over(Transport::Wifi));
    handle.flush().await?;
    println!("   type is now: {}", handle.current_connection_type());
    let usable = handle.connected_networks().await?;
    println!(
        "   usable networks collapse to the VPN: {:?}",
        usable.iter().map(|n| n.id).collect::<Vec<_>>()
    );

    println!("\n5. VPN drops...");
    probe.disconnect(NetworkId(2));
    handle.flush().await?;
    println!("   type is back to: {}", handle.current_connection_type());

    println!("\n6. Application goes to background, then returns...");
    handle
        .set_application_state(ApplicationState::HasStoppedActivities)
        .await?;
    println!("   registered while backgrounded: {}", handle.is_registered());
    handle
        .set_application_state(ApplicationState::HasRunningActivities)
        .await?;
    println!("   registered after returning: {}", handle.is_registered());

    println!("\n7. Shutting down...");
    handle.shutdown().await?;
    let _ = notifier_task.await;

    println!("\n=== Embedding Successful ===");
    println!("Key Points:");
    println!("- Notifier lifecycle is fully controlled by the application");
    println!("- The probe is a plain trait object; any event source can drive it");
    println!("- Observers see only deduplicated, canonical transitions");
    println!("- Handle reads are synchronous and never touch the engine task");

    Ok(())
}
