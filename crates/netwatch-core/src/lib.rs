// # netwatch-core
//
// Core library for the event-driven network reachability and change
// notification service.
//
// ## Architecture Overview
//
// This library canonicalizes a platform's connectivity surface into one
// queryable state plus discrete change notifications:
// - **PlatformProbe**: Trait over the OS surface (queries + push events)
// - **ConnectivityStateMachine**: Roster tracking, VPN precedence, duplicate
//   suppression, bandwidth estimation
// - **RegistrationPolicy**: Gates the platform subscription on application
//   lifecycle
// - **ObserverRegistry**: Fans discrete changes out to consumers
// - **ConnectivityNotifier**: The task that owns all of the above;
//   **NotifierHandle** is the cloneable consumer endpoint
//
// ## Design Principles
//
// 1. **Single Writer**: One task mutates connectivity state; everything else
//    goes through channels or reads a published snapshot
// 2. **Event-Driven**: Probes push events, nothing polls the platform from
//    the core
// 3. **Duplicate Suppression**: Consumers only hear about actual changes
// 4. **Capability Seams**: Platform integrations implement one trait, no
//    OS-specific code in the core
// 5. **Library-First**: The daemon is a thin wrapper; embedding gets the
//    same API

pub mod traits;
pub mod engine;
pub mod registry;
pub mod config;
pub mod error;
pub mod state;
pub mod policy;
pub mod types;

// Re-export core types for convenience
pub use traits::{NetworkObserver, PlatformProbe, ProbeEvent, ProbeEventSender};
pub use engine::{ConnectivityNotifier, NotifierHandle};
pub use registry::{ObserverId, ObserverRegistry};
pub use config::NotifierConfig;
pub use error::{Error, Result};
pub use state::{ConnectivityStateMachine, NetworkChange};
pub use policy::{ApplicationState, RegistrationPolicy};
pub use types::{
    ActiveNetworkState, CanonicalState, CellularGeneration, CellularSubtype, ConnectionType,
    NetworkCapabilities, NetworkDescriptor, NetworkId, Transport,
};
