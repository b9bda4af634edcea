#![forbid(unsafe_code)]

//! `vehicle-bridge`: controller-to-simulator bridge binary.
//!
//! Loads configuration, opens the vehicle session, accepts exactly one
//! controller connection, and streams until the peer disconnects or a stop
//! signal arrives.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use vehicle_bridge::bridge::{share_session, BridgeSummary, DuplexController};
use vehicle_bridge::config::{BridgeConfig, ConfigOverrides};
use vehicle_bridge::logging::{init_tracing, LogFormat};
use vehicle_bridge::transport::LineConnection;
use vehicle_bridge::vehicle::{KinematicSimulator, VehicleSession};
use vehicle_bridge::{AppError, Result};

#[derive(Debug, Parser)]
#[command(
    name = "vehicle-bridge",
    about = "Remote controller to simulated vehicle bridge",
    version,
    long_about = None
)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Interface to listen on.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on.
    #[arg(long)]
    port: Option<u16>,

    /// Name of the simulated vehicle to control.
    #[arg(long)]
    vehicle: Option<String>,

    /// Pause between loop iterations, in milliseconds.
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("vehicle-bridge bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match &args.config {
        Some(path) => BridgeConfig::load_from_path(path)?,
        None => BridgeConfig::default(),
    };
    config.apply_overrides(ConfigOverrides {
        host: args.host,
        port: args.port,
        vehicle: args.vehicle,
        poll_interval_ms: args.poll_interval_ms,
    })?;
    info!("configuration loaded");

    // ── Open the vehicle session ────────────────────────
    let sim = KinematicSimulator::new(
        config.simulator.clone(),
        config.vehicle.name.as_str(),
        config.vehicle.imu_sensor.as_str(),
        config.vehicle.gps_sensor.as_str(),
    );
    let session = VehicleSession::connect(sim, config.session_options())?;

    // ── Accept exactly one controller ───────────────────
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::Io(format!("failed to bind {addr}: {err}")))?;
    info!(%addr, "waiting for controller");

    let (stream, peer) = tokio::select! {
        accepted = listener.accept() => accepted
            .map_err(|err| AppError::Io(format!("accept failed: {err}")))?,
        () = shutdown_signal() => {
            info!("shutdown signal received before a controller connected");
            return Ok(());
        }
    };
    drop(listener);

    let connection = LineConnection::from_tcp(stream, config.streaming.max_line_bytes)
        .with_read_timeout(config.read_timeout());
    let connection_id = uuid::Uuid::new_v4();
    let span = info_span!("bridge", %connection_id, %peer);
    span.in_scope(|| info!("controller connected"));

    // ── Stream until disconnect or stop signal ──────────
    let ct = CancellationToken::new();
    let controller = DuplexController::new(
        Arc::new(connection),
        share_session(session),
        config.poll_interval(),
    )
    .with_shutdown(ct.clone());
    let mut bridge = tokio::spawn(controller.run().instrument(span));

    tokio::select! {
        joined = &mut bridge => return finish(joined),
        () = shutdown_signal() => {
            info!("shutdown signal received");
            ct.cancel();
        }
    }

    // A blocked read only returns on new data or disconnect.
    match tokio::time::timeout(config.shutdown_grace(), bridge).await {
        Ok(joined) => finish(joined),
        Err(_) => {
            warn!(
                grace_ms = config.streaming.shutdown_grace_ms,
                "bridge did not stop within grace period, exiting"
            );
            Ok(())
        }
    }
}

fn finish(joined: std::result::Result<Result<BridgeSummary>, JoinError>) -> Result<()> {
    let summary = joined.map_err(|err| AppError::Io(format!("bridge task failed: {err}")))??;
    info!(
        waypoints = summary.waypoints_plotted,
        applied = summary.commands_applied,
        skipped = summary.commands_skipped,
        sent = summary.states_sent,
        "vehicle-bridge shut down"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}
