//! Duplex streaming between the controller connection and the vehicle.
//!
//! After a one-time waypoint handshake, two tasks run side by side:
//! - `receiver`: reads command lines and applies them to the vehicle.
//! - `sender`: samples vehicle state and writes state lines.
//!
//! Both serialize on one [`SharedSession`] lock and stop cooperatively on a
//! shared [`CancellationToken`](tokio_util::sync::CancellationToken).
//! `controller` drives the phases and owns the connection's lifetime.

pub mod controller;
pub mod receiver;
pub mod sender;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::vehicle::VehicleSession;

pub use controller::DuplexController;

/// A vehicle session shared by the receive and send loops.
pub type SharedSession<S> = Arc<Mutex<VehicleSession<S>>>;

/// Wrap a session for sharing between the loops.
#[must_use]
pub fn share_session<S>(session: VehicleSession<S>) -> SharedSession<S> {
    Arc::new(Mutex::new(session))
}

/// Lifecycle of one bridged connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    /// Waiting for the waypoint line.
    Handshaking,
    /// Receive and send loops running.
    Streaming,
    /// Shutdown flag set; waiting for the loops to return.
    ShuttingDown,
    /// Both loops returned and the connection is closed.
    Closed,
}

/// Counters reported by the receive loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveStats {
    /// Command lines applied to the vehicle.
    pub applied: u64,
    /// Command lines skipped as malformed.
    pub skipped: u64,
}

/// What happened over the lifetime of one connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeSummary {
    /// Waypoints received in the handshake.
    pub waypoints_plotted: usize,
    /// Command lines applied.
    pub commands_applied: u64,
    /// Command lines skipped as malformed.
    pub commands_skipped: u64,
    /// State lines written.
    pub states_sent: u64,
}
