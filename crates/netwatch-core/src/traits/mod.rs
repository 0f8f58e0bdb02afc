// # Trait Definitions
//
// The two seams of the service:
//
// - `PlatformProbe`: capability interface a platform integration implements
// - `NetworkObserver`: consumer interface notified of connectivity changes

pub mod observer;
pub mod probe;

pub use observer::NetworkObserver;
pub use probe::{PlatformProbe, ProbeEvent, ProbeEventSender};
