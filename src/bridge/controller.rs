//! Duplex loop controller.
//!
//! Drives one connection through its phases:
//!
//! 1. `Handshaking`: read one line, decode it as waypoints, plot them.
//! 2. `Streaming`: spawn the receive and send loops.
//! 3. `ShuttingDown`: the shared token fired; wait for both loops.
//! 4. `Closed`: close the transport exactly once and report.
//!
//! A handshake failure closes the connection and returns
//! [`AppError::Handshake`]; the loops are never started.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

use crate::bridge::{receiver, sender, BridgePhase, BridgeSummary, SharedSession};
use crate::protocol::decode_waypoints;
use crate::transport::LineTransport;
use crate::vehicle::Simulator;
use crate::{AppError, Result};

/// Runs the handshake and the two streaming loops over one connection.
pub struct DuplexController<T: ?Sized, S> {
    transport: Arc<T>,
    session: SharedSession<S>,
    interval: Duration,
    shutdown: CancellationToken,
    phase: watch::Sender<BridgePhase>,
}

impl<T, S> DuplexController<T, S>
where
    T: LineTransport + ?Sized + 'static,
    S: Simulator + 'static,
{
    /// Create a controller polling both loops every `interval`.
    #[must_use]
    pub fn new(transport: Arc<T>, session: SharedSession<S>, interval: Duration) -> Self {
        let (phase, _) = watch::channel(BridgePhase::Handshaking);
        Self {
            transport,
            session,
            interval,
            shutdown: CancellationToken::new(),
            phase,
        }
    }

    /// Use `token` as the shutdown flag, so an outside stop signal can end
    /// streaming.
    #[must_use]
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// The shutdown flag shared with both loops.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Watch phase transitions.
    #[must_use]
    pub fn subscribe_phase(&self) -> watch::Receiver<BridgePhase> {
        self.phase.subscribe()
    }

    /// Run the connection to completion.
    ///
    /// # Errors
    ///
    /// - [`AppError::Handshake`] if the waypoint line is missing or malformed.
    /// - [`AppError::Simulator`] or [`AppError::Timeout`] if a loop stopped
    ///   on a fault rather than a disconnect.
    ///
    /// The transport is closed before any of these are returned.
    pub async fn run(self) -> Result<BridgeSummary> {
        let waypoints_plotted = match self.handshake().await {
            Ok(count) => count,
            Err(err) => {
                warn!(error = %err, "handshake failed, closing connection");
                self.set_phase(BridgePhase::ShuttingDown);
                self.finish().await;
                return Err(err);
            }
        };

        self.set_phase(BridgePhase::Streaming);
        info!(
            waypoints = waypoints_plotted,
            interval_ms = self.interval.as_millis(),
            "streaming started"
        );

        let receive = tokio::spawn(
            receiver::run_receiver(
                Arc::clone(&self.transport),
                Arc::clone(&self.session),
                self.interval,
                self.shutdown.clone(),
            )
            .in_current_span(),
        );
        let send = tokio::spawn(
            sender::run_sender(
                Arc::clone(&self.transport),
                Arc::clone(&self.session),
                self.interval,
                self.shutdown.clone(),
            )
            .in_current_span(),
        );

        self.shutdown.cancelled().await;
        self.set_phase(BridgePhase::ShuttingDown);
        debug!("shutdown flag set, joining loops");

        let (receive, send) = tokio::join!(receive, send);
        self.finish().await;

        let stats = flatten(receive)?;
        let states_sent = flatten(send)?;

        let summary = BridgeSummary {
            waypoints_plotted,
            commands_applied: stats.applied,
            commands_skipped: stats.skipped,
            states_sent,
        };
        info!(
            commands_applied = summary.commands_applied,
            commands_skipped = summary.commands_skipped,
            states_sent = summary.states_sent,
            "bridge closed"
        );
        Ok(summary)
    }

    /// Read the waypoint line and plot it. Returns the waypoint count.
    async fn handshake(&self) -> Result<usize> {
        let line = self.transport.read_line().await.map_err(|e| match e {
            AppError::ConnectionClosed(msg) => {
                AppError::Handshake(format!("peer disconnected before waypoints: {msg}"))
            }
            other => AppError::Handshake(format!("waypoint read failed: {other}")),
        })?;

        let waypoints = decode_waypoints(&line)
            .map_err(|e| AppError::Handshake(format!("invalid waypoint line: {e}")))?;

        // Markers are visual only; a failed draw does not end the session.
        if let Err(e) = self.session.lock().await.plot_waypoints(&waypoints) {
            warn!(error = %e, "waypoint plot failed, continuing");
        }

        info!(count = waypoints.len(), "handshake complete");
        Ok(waypoints.len())
    }

    async fn finish(&self) {
        self.transport.close().await;
        self.set_phase(BridgePhase::Closed);
    }

    fn set_phase(&self, phase: BridgePhase) {
        debug!(?phase, "bridge phase changed");
        self.phase.send_replace(phase);
    }
}

fn flatten<V>(joined: std::result::Result<Result<V>, JoinError>) -> Result<V> {
    joined.map_err(|e| AppError::Io(format!("streaming task failed: {e}")))?
}
