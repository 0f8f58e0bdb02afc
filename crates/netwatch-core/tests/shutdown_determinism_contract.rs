//! Architectural Contract Test: Shutdown Determinism
//!
//! This test verifies that the notifier task stops promptly and releases
//! platform resources exactly once, however it is stopped.
//!
//! Constraints verified:
//! - The shutdown command terminates the task, and the subscription is
//!   released before the shutdown call returns
//! - Shutdown without a live subscription releases nothing
//! - Dropping every handle stops the task
//! - Handle calls after shutdown fail cleanly instead of hanging
//!
//! If this test fails, someone has added:
//! - Detached background work that outlives the notifier task
//! - A teardown path that can skip, or double, the platform unsubscribe
//! - A handle call that blocks forever once the task is gone

mod common;

use std::time::Duration;

use common::*;
use netwatch_core::{ApplicationState, Error, NetworkId, NotifierConfig, ProbeEvent};

#[tokio::test]
async fn shutdown_command_terminates_the_task() {
    let probe = ControlledProbe::new();
    let test = spawn_notifier(probe.clone(), NotifierConfig::new()).await;

    test.handle.shutdown().await.expect("shutdown succeeds");
    // The ack is sent only after teardown, so the release must already be
    // visible here
    assert_eq!(probe.unsubscribe_calls(), 1);

    let joined = tokio::time::timeout(Duration::from_secs(5), test.task)
        .await
        .expect("task exits promptly")
        .expect("task does not panic");
    assert!(joined.is_ok());
}

#[tokio::test]
async fn shutdown_without_a_subscription_releases_nothing() {
    let probe = ControlledProbe::new();
    let test = spawn_notifier(
        probe.clone(),
        NotifierConfig::new()
            .with_initial_application_state(ApplicationState::HasStoppedActivities),
    )
    .await;
    assert_eq!(probe.subscribe_calls(), 0);

    test.handle.shutdown().await.expect("shutdown succeeds");
    assert_eq!(probe.unsubscribe_calls(), 0);
}

#[tokio::test]
async fn dropping_every_handle_stops_the_task() {
    let probe = ControlledProbe::new();
    let TestNotifier {
        probe: _probe,
        handle,
        observer: _observer,
        task,
    } = spawn_notifier(probe.clone(), NotifierConfig::new()).await;

    drop(handle);

    let joined = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("task exits once the last handle is gone")
        .expect("task does not panic");
    assert!(joined.is_ok());
    assert_eq!(probe.unsubscribe_calls(), 1);
}

#[tokio::test]
async fn handle_calls_after_shutdown_fail_cleanly() {
    let probe = ControlledProbe::new();
    let test = spawn_notifier(probe.clone(), NotifierConfig::new()).await;
    test.handle.shutdown().await.expect("shutdown succeeds");

    let error = test.handle.flush().await.unwrap_err();
    assert!(matches!(error, Error::NotifierStopped));
    let error = test.handle.connected_networks().await.unwrap_err();
    assert!(matches!(error, Error::NotifierStopped));
    let error = test.handle.shutdown().await.unwrap_err();
    assert!(matches!(error, Error::NotifierStopped));
}

#[tokio::test]
async fn shutdown_wins_over_queued_probe_events() {
    let probe = ControlledProbe::new();
    let test = spawn_notifier(probe.clone(), NotifierConfig::new()).await;

    // Pile up events the task has not had a chance to service yet; none of
    // these ids resolve to capabilities, so they are safely ignorable
    for i in 0..32u32 {
        probe.send(ProbeEvent::NetworkAvailable(NetworkId(i)));
    }
    test.handle.shutdown().await.expect("shutdown succeeds");

    let joined = tokio::time::timeout(Duration::from_secs(5), test.task)
        .await
        .expect("task exits despite the backlog")
        .expect("task does not panic");
    assert!(joined.is_ok());
    assert_eq!(probe.unsubscribe_calls(), 1);
}
