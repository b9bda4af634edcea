//! Receive loop: command lines in, vehicle controls out.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bridge::{ReceiveStats, SharedSession};
use crate::protocol::decode_command;
use crate::transport::LineTransport;
use crate::vehicle::Simulator;
use crate::Result;

/// Read, decode, and apply command lines until shutdown.
///
/// Each iteration holds the session lock across the read, the decode, and
/// the apply, then releases it and waits `interval`. Malformed lines are
/// counted and skipped.
///
/// The loop ends when `shutdown` is cancelled or the peer disconnects. On
/// any exit, including an error return, `shutdown` is cancelled so the send
/// loop stops too.
///
/// # Cancellation
///
/// Cancellation is observed between iterations and while waiting; a read
/// that is already blocked is not interrupted.
///
/// # Errors
///
/// Returns the first simulator fault or read timeout. A disconnect is not an
/// error.
pub async fn run_receiver<T, S>(
    transport: Arc<T>,
    session: SharedSession<S>,
    interval: Duration,
    shutdown: CancellationToken,
) -> Result<ReceiveStats>
where
    T: LineTransport + ?Sized,
    S: Simulator,
{
    let _stop_on_exit = shutdown.clone().drop_guard();
    let mut stats = ReceiveStats::default();

    loop {
        if shutdown.is_cancelled() || transport.is_closed() {
            debug!("receiver: shutdown observed, stopping");
            break;
        }

        {
            let mut session = session.lock().await;
            if shutdown.is_cancelled() {
                debug!("receiver: shutdown observed after lock, stopping");
                break;
            }

            match transport.read_line().await {
                Ok(line) => match decode_command(&line) {
                    Ok(cmd) => {
                        session.apply_command(&cmd).inspect_err(|e| {
                            warn!(error = %e, "receiver: apply failed, stopping");
                        })?;
                        stats.applied += 1;
                    }
                    Err(e) => {
                        stats.skipped += 1;
                        debug!(
                            error = %e,
                            raw_line = %line,
                            "receiver: skipping malformed command"
                        );
                    }
                },
                Err(e) if e.is_connection_closed() => {
                    info!(reason = %e, "receiver: connection closed, stopping");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "receiver: read failed, stopping");
                    return Err(e);
                }
            }
        }

        tokio::select! {
            biased;
            () = shutdown.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }

    debug!(
        applied = stats.applied,
        skipped = stats.skipped,
        "receiver: stopped"
    );
    Ok(stats)
}
