//! Send loop: vehicle state out as state lines.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bridge::SharedSession;
use crate::protocol::encode_state;
use crate::transport::LineTransport;
use crate::vehicle::Simulator;
use crate::Result;

/// Sample, encode, and write vehicle state until shutdown.
///
/// Each iteration holds the session lock across the sample and the write,
/// then releases it and waits `interval`. Returns the number of state lines
/// written.
///
/// On any exit `shutdown` is cancelled so the receive loop stops at its next
/// iteration boundary.
///
/// # Errors
///
/// Returns the first simulator fault. A closed connection is not an error.
pub async fn run_sender<T, S>(
    transport: Arc<T>,
    session: SharedSession<S>,
    interval: Duration,
    shutdown: CancellationToken,
) -> Result<u64>
where
    T: LineTransport + ?Sized,
    S: Simulator,
{
    let _stop_on_exit = shutdown.clone().drop_guard();
    let mut sent = 0u64;

    loop {
        if shutdown.is_cancelled() || transport.is_closed() {
            debug!("sender: shutdown observed, stopping");
            break;
        }

        {
            let mut session = session.lock().await;
            if shutdown.is_cancelled() {
                debug!("sender: shutdown observed after lock, stopping");
                break;
            }

            let report = session.sample_state().inspect_err(|e| {
                warn!(error = %e, "sender: sample failed, stopping");
            })?;

            match transport.write_line(encode_state(&report)).await {
                Ok(()) => sent += 1,
                Err(e) if e.is_connection_closed() => {
                    info!(reason = %e, "sender: connection closed, stopping");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "sender: write failed, stopping");
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

    debug!(sent, "sender: stopped");
    Ok(sent)
}
