// # Notifier Configuration
//
// Settings the notifier is constructed with. The defaults assume a
// foregrounded application with auto-detection on, so a freshly built
// notifier registers immediately.

use serde::{Deserialize, Serialize};

use crate::policy::{ApplicationState, RegistrationPolicy};

/// Configuration for a [`crate::engine::ConnectivityNotifier`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// When the notifier holds a live platform subscription.
    #[serde(default)]
    pub policy: RegistrationPolicy,

    /// Lifecycle state assumed before the embedder reports a real one.
    #[serde(default)]
    pub initial_application_state: ApplicationState,

    /// Whether platform auto-detection starts enabled. When off, the
    /// notifier takes one snapshot at startup and then holds it frozen
    /// until auto-detection is switched on.
    #[serde(default = "default_auto_detect")]
    pub auto_detect: bool,
}

impl NotifierConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self {
            policy: RegistrationPolicy::default(),
            initial_application_state: ApplicationState::default(),
            auto_detect: default_auto_detect(),
        }
    }

    /// Set the registration policy.
    pub fn with_policy(mut self, policy: RegistrationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the assumed initial application state.
    pub fn with_initial_application_state(mut self, state: ApplicationState) -> Self {
        self.initial_application_state = state;
        self
    }

    /// Enable or disable auto-detection at startup.
    pub fn with_auto_detect(mut self, auto_detect: bool) -> Self {
        self.auto_detect = auto_detect;
        self
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_auto_detect() -> bool {
    true
}
