// # Connectivity Notifier
//
// The long-running task that owns the state machine, plus the cloneable
// handle consumers talk to.
//
// ## Architecture
//
// ```text
// PlatformProbe ──ProbeEvent──┐                  ┌─► watch snapshot ─► handle reads
//                             ▼                  │
//   NotifierHandle ──cmd──► select loop ─────────┤
//        (oneshot acks)       │                  └─► ObserverRegistry ─► callbacks
//                             ▼
//                  ConnectivityStateMachine
// ```
//
// Exactly one task mutates connectivity state. Everything else reaches it
// through two channels: probes push events, handles send acked commands.
// Synchronous reads never touch the task; they borrow the watch snapshot the
// task publishes after every mutation.
//
// ## Lifecycle
//
// Startup applies the registration policy (subscribe + resync, or a single
// priming recompute when staying unregistered). The loop then runs until a
// shutdown command or until every handle is dropped; teardown releases a
// live probe subscription exactly once.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::config::NotifierConfig;
use crate::error::{Error, Result};
use crate::policy::{ApplicationState, RegistrationPolicy};
use crate::registry::{ObserverId, ObserverRegistry};
use crate::state::{ConnectivityStateMachine, NetworkChange};
use crate::traits::{NetworkObserver, PlatformProbe, ProbeEvent, ProbeEventSender};
use crate::types::{CanonicalState, ConnectionType, NetworkDescriptor};

/// Commands a handle can send to the notifier task. Each carries a oneshot
/// the task completes once the command has fully taken effect.
enum Command {
    SetApplicationState {
        state: ApplicationState,
        ack: oneshot::Sender<()>,
    },
    SetAutoDetect {
        enabled: bool,
        ack: oneshot::Sender<()>,
    },
    ConnectedNetworks {
        reply: oneshot::Sender<Vec<NetworkDescriptor>>,
    },
    Flush {
        ack: oneshot::Sender<()>,
    },
    Shutdown {
        ack: oneshot::Sender<()>,
    },
}

/// Value published through the watch channel after every mutation.
#[derive(Debug, Clone)]
struct Snapshot {
    state: CanonicalState,
    registered: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            state: CanonicalState::offline(),
            registered: false,
        }
    }
}

const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// The notifier task. Construct with [`ConnectivityNotifier::new`], then
/// spawn [`run`](ConnectivityNotifier::run) on the runtime.
pub struct ConnectivityNotifier {
    probe: Arc<dyn PlatformProbe>,
    machine: ConnectivityStateMachine,
    observers: Arc<ObserverRegistry>,
    policy: RegistrationPolicy,
    app_state: ApplicationState,
    auto_detect: bool,
    registered: bool,
    command_rx: mpsc::Receiver<Command>,
    probe_rx: mpsc::UnboundedReceiver<ProbeEvent>,
    /// Kept so the probe channel never closes and so fresh clones can be
    /// handed out on each (re-)subscription.
    probe_tx: ProbeEventSender,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl ConnectivityNotifier {
    /// Build the notifier task and its first handle.
    pub fn new(
        probe: Arc<dyn PlatformProbe>,
        config: NotifierConfig,
    ) -> (ConnectivityNotifier, NotifierHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (probe_tx, probe_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());
        let observers = Arc::new(ObserverRegistry::new());

        let notifier = ConnectivityNotifier {
            machine: ConnectivityStateMachine::new(Arc::clone(&probe)),
            probe,
            observers: Arc::clone(&observers),
            policy: config.policy,
            app_state: config.initial_application_state,
            auto_detect: config.auto_detect,
            registered: false,
            command_rx,
            probe_rx,
            probe_tx,
            snapshot_tx,
        };
        let handle = NotifierHandle {
            command_tx,
            snapshot_rx,
            observers,
        };
        (notifier, handle)
    }

    /// Run until shutdown is commanded or every handle is dropped.
    pub async fn run(mut self) -> Result<()> {
        self.startup().await;
        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    match command {
                        Some(command) => {
                            if self.handle_command(command).await {
                                break;
                            }
                        }
                        None => {
                            debug!("all notifier handles dropped, stopping");
                            break;
                        }
                    }
                }
                Some(event) = self.probe_rx.recv() => {
                    self.handle_probe_event(event).await;
                }
            }
        }
        self.teardown().await;
        info!("connectivity notifier stopped");
        Ok(())
    }

    async fn startup(&mut self) {
        info!(
            probe = self.probe.probe_name(),
            policy = ?self.policy,
            auto_detect = self.auto_detect,
            "connectivity notifier starting"
        );
        if self.auto_detect && self.policy.should_register(self.app_state) {
            self.register().await;
        } else {
            // Not subscribing, but consumers still get one best-effort
            // reading instead of a permanent offline default.
            let changes = self.machine.refresh().await;
            self.emit(changes);
        }
    }

    /// Returns true when the loop should stop.
    async fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::SetApplicationState { state, ack } => {
                if state != self.app_state {
                    debug!(from = ?self.app_state, to = ?state, "application state changed");
                    self.app_state = state;
                    if self.auto_detect {
                        self.apply_policy().await;
                    }
                }
                let _ = ack.send(());
                false
            }
            Command::SetAutoDetect { enabled, ack } => {
                if enabled != self.auto_detect {
                    info!(enabled, "auto-detection toggled");
                    self.auto_detect = enabled;
                    self.apply_policy().await;
                    if enabled && !self.registered {
                        // Policy keeps us unsubscribed, but detection coming
                        // back on still refreshes the frozen snapshot.
                        let changes = self.machine.refresh().await;
                        self.emit(changes);
                    }
                }
                let _ = ack.send(());
                false
            }
            Command::ConnectedNetworks { reply } => {
                let _ = reply.send(self.machine.roster_snapshot());
                false
            }
            Command::Flush { ack } => {
                // Drain everything probes queued before this command so the
                // caller observes a settled state.
                while let Ok(event) = self.probe_rx.try_recv() {
                    self.handle_probe_event(event).await;
                }
                let _ = ack.send(());
                false
            }
            Command::Shutdown { ack } => {
                info!("shutdown requested");
                self.teardown().await;
                let _ = ack.send(());
                true
            }
        }
    }

    async fn handle_probe_event(&mut self, event: ProbeEvent) {
        if !self.registered {
            // Queued before an unsubscribe landed, or a late send from a
            // stopping probe worker.
            debug!(?event, "probe event while unregistered dropped");
            return;
        }
        let changes = self.machine.handle_event(event).await;
        self.emit(changes);
    }

    async fn apply_policy(&mut self) {
        if self.auto_detect && self.policy.should_register(self.app_state) {
            self.register().await;
        } else {
            self.unregister().await;
        }
    }

    /// Idempotent: a no-op while already subscribed.
    async fn register(&mut self) {
        if self.registered {
            return;
        }
        match self.probe.subscribe(self.probe_tx.clone()).await {
            Ok(()) => {
                self.registered = true;
                self.publish_snapshot();
                info!(probe = self.probe.probe_name(), "subscribed to platform events");
                let changes = self.machine.resync().await;
                self.emit(changes);
            }
            Err(error) => {
                // Stay alive and report offline; the next transition into
                // the foreground retries.
                warn!(%error, "platform denied event registration, reporting offline");
                let changes = self.machine.reset_offline();
                self.emit(changes);
            }
        }
    }

    /// Idempotent: a no-op while not subscribed.
    async fn unregister(&mut self) {
        if !self.registered {
            return;
        }
        self.probe.unsubscribe().await;
        self.registered = false;
        // Connectivity churn while unsubscribed is invisible; the roster is
        // dropped and the last published state stays up as accepted
        // staleness until the next registration resync.
        self.machine.clear_roster();
        self.publish_snapshot();
        info!("unsubscribed from platform events");
    }

    async fn teardown(&mut self) {
        if self.registered {
            self.probe.unsubscribe().await;
            self.registered = false;
            self.publish_snapshot();
        }
    }

    /// Publish the current snapshot, then deliver changes synchronously. The
    /// snapshot goes first so an observer reading a handle inside its
    /// callback sees the state the callback describes.
    fn emit(&self, changes: Vec<NetworkChange>) {
        self.publish_snapshot();
        for change in &changes {
            self.observers.dispatch(change);
        }
    }

    fn publish_snapshot(&self) {
        let _ = self.snapshot_tx.send(Snapshot {
            state: self.machine.published().clone(),
            registered: self.registered,
        });
    }
}

/// Cloneable endpoint for the notifier task.
///
/// Reads ([`is_online`](NotifierHandle::is_online) and friends) are
/// synchronous borrows of the task's last published snapshot and never
/// block. Mutating calls are async and resolve once the task has fully
/// applied the command; they return [`Error::NotifierStopped`] when the task
/// is gone.
///
/// Observer management goes straight to the shared registry, so observers
/// can be added or removed from any context, including inside a callback.
#[derive(Clone)]
pub struct NotifierHandle {
    command_tx: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<Snapshot>,
    observers: Arc<ObserverRegistry>,
}

impl NotifierHandle {
    /// Whether any network currently provides connectivity.
    pub fn is_online(&self) -> bool {
        self.snapshot_rx.borrow().state.is_online()
    }

    /// The canonical connection type last published.
    pub fn current_connection_type(&self) -> ConnectionType {
        self.snapshot_rx.borrow().state.connection_type
    }

    /// The bandwidth estimate last published, in Mbps.
    pub fn current_max_bandwidth_mbps(&self) -> f64 {
        self.snapshot_rx.borrow().state.max_bandwidth_mbps
    }

    /// Full canonical state last published.
    pub fn current_state(&self) -> CanonicalState {
        self.snapshot_rx.borrow().state.clone()
    }

    /// Whether the notifier currently holds a platform subscription.
    pub fn is_registered(&self) -> bool {
        self.snapshot_rx.borrow().registered
    }

    pub fn add_observer(&self, observer: Arc<dyn NetworkObserver>) -> ObserverId {
        self.observers.add(observer)
    }

    /// Returns false when the id was already removed.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// Report an application lifecycle transition. Resolves once any
    /// resulting (un)registration and resync have completed.
    pub async fn set_application_state(&self, state: ApplicationState) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.send(Command::SetApplicationState { state, ack }).await?;
        done.await.map_err(|_| Error::NotifierStopped)
    }

    /// Toggle auto-detection. Disabling force-unregisters regardless of
    /// policy and freezes the published state; enabling re-applies the
    /// policy against the last reported application state.
    pub async fn set_auto_detect(&self, enabled: bool) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.send(Command::SetAutoDetect { enabled, ack }).await?;
        done.await.map_err(|_| Error::NotifierStopped)
    }

    /// The usable-network roster, ascending by id. Collapses to the VPN
    /// alone while an accessible VPN is up; empty while unregistered.
    pub async fn connected_networks(&self) -> Result<Vec<NetworkDescriptor>> {
        let (reply, answer) = oneshot::channel();
        self.send(Command::ConnectedNetworks { reply }).await?;
        answer.await.map_err(|_| Error::NotifierStopped)
    }

    /// Wait until every probe event queued before this call has been
    /// processed.
    pub async fn flush(&self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.send(Command::Flush { ack }).await?;
        done.await.map_err(|_| Error::NotifierStopped)
    }

    /// Stop the notifier task. Resolves after the probe subscription has
    /// been released.
    pub async fn shutdown(&self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.send(Command::Shutdown { ack }).await?;
        done.await.map_err(|_| Error::NotifierStopped)
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| Error::NotifierStopped)
    }
}
