// # Registration Policy
//
// Decides when the notifier holds a live platform subscription, driven by
// the embedding application's lifecycle state. The policy itself is a pure
// decision function; the notifier owns the idempotence bit and performs the
// actual subscribe/unsubscribe calls.

use serde::{Deserialize, Serialize};

/// Lifecycle state of the embedding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationState {
    /// At least one activity is visible and running.
    #[default]
    HasRunningActivities,
    /// Activities exist but none are running.
    HasPausedActivities,
    HasStoppedActivities,
    HasDestroyedActivities,
}

/// When to hold a live platform subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationPolicy {
    /// Subscribe only while the application is foregrounded. Connectivity
    /// churn while backgrounded is not tracked; re-registration resyncs.
    #[default]
    WhileForeground,
    /// Subscribe at startup and hold the subscription regardless of
    /// application state.
    Always,
}

impl RegistrationPolicy {
    pub fn should_register(self, state: ApplicationState) -> bool {
        match self {
            RegistrationPolicy::Always => true,
            RegistrationPolicy::WhileForeground => {
                matches!(state, ApplicationState::HasRunningActivities)
            }
        }
    }
}
