//! Shutdown and failure-path tests for the duplex controller.
//!
//! Every path must end with the transport closed exactly once and the phase
//! watch reporting `Closed`.

use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use vehicle_bridge::bridge::{BridgePhase, DuplexController};
use vehicle_bridge::transport::LineTransport;
use vehicle_bridge::AppError;

use super::test_helpers::{fake_session, wait_until, ScriptedTransport, TEST_INTERVAL};

#[tokio::test]
async fn peer_disconnect_closes_transport_once() {
    let (session, recorder) = fake_session();
    let (transport, mut peer) = ScriptedTransport::new();
    let controller = DuplexController::new(transport.clone(), session, TEST_INTERVAL);
    let phase = controller.subscribe_phase();
    assert_eq!(*phase.borrow(), BridgePhase::Handshaking);

    let run = tokio::spawn(controller.run());
    peer.send("0,0");
    peer.send("0.5,0,0");
    wait_until("command applied", || recorder.applied().len() == 1).await;
    assert_eq!(*phase.borrow(), BridgePhase::Streaming);

    peer.disconnect();
    let joined = tokio::time::timeout(TEST_INTERVAL * 50, run)
        .await
        .expect("loops stop after the disconnect");
    joined.unwrap().expect("disconnect is a clean exit");

    assert_eq!(transport.close_calls(), 1, "transport closed exactly once");
    assert!(transport.is_closed());
    assert_eq!(*phase.borrow(), BridgePhase::Closed);
}

#[tokio::test]
async fn malformed_waypoints_fail_handshake() {
    let (session, recorder) = fake_session();
    let (transport, peer) = ScriptedTransport::new();
    let controller = DuplexController::new(transport.clone(), session, TEST_INTERVAL);
    let phase = controller.subscribe_phase();

    peer.send("0,0,1");
    let err = controller
        .run()
        .await
        .expect_err("odd field count is fatal");

    assert!(matches!(err, AppError::Handshake(_)), "got {err:?}");
    assert!(recorder.plotted().is_empty(), "nothing plotted");
    assert!(recorder.applied().is_empty(), "loops never started");
    assert_eq!(transport.close_calls(), 1);
    assert_eq!(*phase.borrow(), BridgePhase::Closed);
}

#[tokio::test]
async fn non_numeric_waypoints_fail_handshake() {
    let (session, _recorder) = fake_session();
    let (transport, peer) = ScriptedTransport::new();
    let controller = DuplexController::new(transport.clone(), session, TEST_INTERVAL);

    peer.send("0,0,north,1");
    let err = controller
        .run()
        .await
        .expect_err("non-numeric waypoint is fatal");

    assert!(matches!(err, AppError::Handshake(_)), "got {err:?}");
    assert_eq!(transport.close_calls(), 1);
}

#[tokio::test]
async fn disconnect_before_handshake_is_a_handshake_error() {
    let (session, recorder) = fake_session();
    let (transport, mut peer) = ScriptedTransport::new();
    let controller = DuplexController::new(transport.clone(), session, TEST_INTERVAL);

    peer.disconnect();
    let err = controller.run().await.expect_err("no waypoint line");

    assert!(matches!(err, AppError::Handshake(_)), "got {err:?}");
    assert_eq!(recorder.samples.load(Ordering::SeqCst), 0, "no state sampled");
    assert_eq!(transport.close_calls(), 1);
}

#[tokio::test]
async fn plot_failure_does_not_end_the_session() {
    let (session, recorder) = fake_session();
    recorder.fail_plot.store(true, Ordering::SeqCst);
    let (transport, mut peer) = ScriptedTransport::new();
    let controller = DuplexController::new(transport.clone(), session, TEST_INTERVAL);
    let run = tokio::spawn(controller.run());

    peer.send("0,0,1,1");
    peer.send("0.2,0,0");
    wait_until("command applied", || recorder.applied().len() == 1).await;
    peer.disconnect();

    let summary = run.await.unwrap().expect("plot failure is not fatal");
    assert_eq!(summary.waypoints_plotted, 2);
    assert_eq!(summary.commands_applied, 1);
}

#[tokio::test]
async fn simulator_fault_while_applying_stops_both_loops() {
    let (session, recorder) = fake_session();
    recorder.fail_apply.store(true, Ordering::SeqCst);
    let (transport, peer) = ScriptedTransport::new();
    let controller = DuplexController::new(transport.clone(), session, TEST_INTERVAL);
    let phase = controller.subscribe_phase();

    peer.send("");
    peer.send("1.0,0,0");
    let err = tokio::time::timeout(Duration::from_secs(2), controller.run())
        .await
        .expect("a fault ends the bridge without a disconnect")
        .expect_err("fault is reported");

    assert!(matches!(err, AppError::Simulator(_)), "got {err:?}");
    assert_eq!(transport.close_calls(), 1);
    assert_eq!(*phase.borrow(), BridgePhase::Closed);
}

#[tokio::test]
async fn external_cancel_stops_after_pending_read_returns() {
    let (session, recorder) = fake_session();
    let (transport, peer) = ScriptedTransport::new();
    let token = CancellationToken::new();
    let controller = DuplexController::new(transport.clone(), session, TEST_INTERVAL)
        .with_shutdown(token.clone());
    let mut phase = controller.subscribe_phase();
    let run = tokio::spawn(controller.run());

    peer.send("");
    peer.send("0.1,0,0");
    wait_until("command applied", || recorder.applied().len() == 1).await;

    token.cancel();
    phase
        .wait_for(|p| matches!(p, BridgePhase::ShuttingDown | BridgePhase::Closed))
        .await
        .expect("phase sender alive");

    // The receive loop may be parked in a read; one more line releases it.
    peer.send("0.1,0,0");
    let summary = tokio::time::timeout(Duration::from_secs(2), run)
        .await
        .expect("bridge stops once the read returns")
        .unwrap()
        .expect("cancellation is a clean exit");

    assert!(summary.commands_applied >= 1);
    assert_eq!(transport.close_calls(), 1);
    assert_eq!(*phase.borrow(), BridgePhase::Closed);
}

#[tokio::test]
async fn shutdown_token_is_shared_with_caller() {
    let (session, _recorder) = fake_session();
    let (transport, _peer) = ScriptedTransport::new();
    let token = CancellationToken::new();
    let controller =
        DuplexController::new(transport, session, TEST_INTERVAL).with_shutdown(token.clone());

    controller.shutdown_token().cancel();
    assert!(token.is_cancelled());
}
