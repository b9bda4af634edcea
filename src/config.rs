//! Bridge configuration parsing and validation.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! yields a working configuration listening on `127.0.0.1:3000`.

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::models::PlotStyle;
use crate::protocol::codec::DEFAULT_MAX_LINE_BYTES;
use crate::vehicle::kinematic::KinematicParams;
use crate::vehicle::SessionOptions;
use crate::{AppError, Result};

/// Listening address for the single controller connection.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    3000
}

/// Which simulated vehicle and sensors the session binds to.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct VehicleConfig {
    /// Vehicle name in the simulator.
    #[serde(default = "default_vehicle_name")]
    pub name: String,
    /// IMU sensor name.
    #[serde(default = "default_imu_sensor")]
    pub imu_sensor: String,
    /// GPS sensor name.
    #[serde(default = "default_gps_sensor")]
    pub gps_sensor: String,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            name: default_vehicle_name(),
            imu_sensor: default_imu_sensor(),
            gps_sensor: default_gps_sensor(),
        }
    }
}

fn default_vehicle_name() -> String {
    "Car".into()
}

fn default_imu_sensor() -> String {
    "Imu".into()
}

fn default_gps_sensor() -> String {
    "Gps".into()
}

/// Timing of the receive and send loops.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct StreamingConfig {
    /// Pause between loop iterations.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Read timeout; 0 means wait forever.
    #[serde(default)]
    pub read_timeout_seconds: u64,
    /// Longest accepted inbound line.
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
    /// How long to wait for the loops after a stop signal.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            read_timeout_seconds: 0,
            max_line_bytes: default_max_line_bytes(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    10
}

fn default_max_line_bytes() -> usize {
    DEFAULT_MAX_LINE_BYTES
}

fn default_shutdown_grace_ms() -> u64 {
    500
}

/// Appearance of the waypoint markers.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct PlotConfig {
    /// Marker colour as RGBA.
    pub color_rgba: [f32; 4],
    /// Marker size.
    pub size: f32,
    /// Height at which markers are drawn.
    pub marker_height: f64,
    /// Seconds visible; negative means forever.
    pub duration: f32,
    /// Whether markers survive a flush.
    pub persistent: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        let style = PlotStyle::default();
        Self {
            color_rgba: style.color_rgba,
            size: style.size,
            marker_height: 1.0,
            duration: style.duration,
            persistent: style.persistent,
        }
    }
}

impl PlotConfig {
    /// Drawing style handed to the simulator.
    #[must_use]
    pub fn style(&self) -> PlotStyle {
        PlotStyle {
            color_rgba: self.color_rgba,
            size: self.size,
            duration: self.duration,
            persistent: self.persistent,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Replaces `server.host`.
    pub host: Option<String>,
    /// Replaces `server.port`.
    pub port: Option<u16>,
    /// Replaces `vehicle.name`.
    pub vehicle: Option<String>,
    /// Replaces `streaming.poll_interval_ms`.
    pub poll_interval_ms: Option<u64>,
}

/// Top-level configuration parsed from `bridge.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct BridgeConfig {
    /// Listening address.
    #[serde(default)]
    pub server: ServerConfig,
    /// Vehicle and sensor names.
    #[serde(default)]
    pub vehicle: VehicleConfig,
    /// Loop timing and line limits.
    #[serde(default)]
    pub streaming: StreamingConfig,
    /// Waypoint marker style.
    #[serde(default)]
    pub plot: PlotConfig,
    /// Built-in simulator parameters.
    #[serde(default)]
    pub simulator: KinematicParams,
}

impl BridgeConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read, contains
    /// invalid TOML, or fails validation.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge command-line overrides and re-validate.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the merged configuration is invalid.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<()> {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(vehicle) = overrides.vehicle {
            self.vehicle.name = vehicle;
        }
        if let Some(interval) = overrides.poll_interval_ms {
            self.streaming.poll_interval_ms = interval;
        }
        self.validate()
    }

    /// Address the listener binds to.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let host = self.server.host.trim();
        let ip: IpAddr = host
            .parse()
            .map_err(|err| AppError::Config(format!("invalid server.host '{host}': {err}")))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Pause between loop iterations.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.streaming.poll_interval_ms)
    }

    /// Read timeout, or `None` to wait forever.
    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        match self.streaming.read_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Grace period after a stop signal.
    #[must_use]
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.streaming.shutdown_grace_ms)
    }

    /// Options for opening the vehicle session.
    #[must_use]
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            vehicle: self.vehicle.name.clone(),
            imu_sensor: self.vehicle.imu_sensor.clone(),
            gps_sensor: self.vehicle.gps_sensor.clone(),
            plot_style: self.plot.style(),
            marker_height: self.plot.marker_height,
        }
    }

    /// Check invariants; called again after CLI overrides are merged.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config("server.port must be non-zero".into()));
        }

        if self.streaming.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "streaming.poll_interval_ms must be greater than zero".into(),
            ));
        }

        if self.streaming.max_line_bytes < 64 {
            return Err(AppError::Config(
                "streaming.max_line_bytes must be at least 64".into(),
            ));
        }

        for (key, value) in [
            ("vehicle.name", &self.vehicle.name),
            ("vehicle.imu_sensor", &self.vehicle.imu_sensor),
            ("vehicle.gps_sensor", &self.vehicle.gps_sensor),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("{key} must not be empty")));
            }
        }

        if self.plot.size <= 0.0 {
            return Err(AppError::Config("plot.size must be positive".into()));
        }

        if self.simulator.wheelbase_m <= 0.0 {
            return Err(AppError::Config(
                "simulator.wheelbase_m must be positive".into(),
            ));
        }

        self.socket_addr()?;
        Ok(())
    }
}
