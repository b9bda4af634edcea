//! Vehicle session: the bridge's view of one simulated car.

use tracing::{debug, info};

use crate::models::{CarControls, ControlCommand, PlotStyle, VehicleStateReport, WaypointSet};
use crate::vehicle::Simulator;
use crate::{AppError, Result};

/// Names and drawing options a session is opened with.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Vehicle to take control of.
    pub vehicle: String,
    /// IMU sensor used for orientation.
    pub imu_sensor: String,
    /// GPS sensor used for position.
    pub gps_sensor: String,
    /// Appearance of plotted waypoints.
    pub plot_style: PlotStyle,
    /// Height at which waypoint markers are drawn.
    pub marker_height: f64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            vehicle: "Car".into(),
            imu_sensor: "Imu".into(),
            gps_sensor: "Gps".into(),
            plot_style: PlotStyle::default(),
            marker_height: 1.0,
        }
    }
}

/// Owns the simulator handle and the vehicle's live control object.
///
/// Callers share a session between the receive and send loops behind a
/// single [`tokio::sync::Mutex`]; the session itself does no locking.
#[derive(Debug)]
pub struct VehicleSession<S> {
    sim: S,
    options: SessionOptions,
    controls: CarControls,
}

impl<S: Simulator> VehicleSession<S> {
    /// Connect to the simulator and take control of the configured vehicle.
    ///
    /// Confirms connectivity, enables API control, then fetches the control
    /// object and switches it to manual gear selection.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SessionInit`] if any of these steps fails. There
    /// is no retry.
    pub fn connect(mut sim: S, options: SessionOptions) -> Result<Self> {
        let vehicle = options.vehicle.as_str();

        sim.confirm_connection()
            .map_err(|e| AppError::SessionInit(format!("simulator unreachable: {e}")))?;
        sim.enable_api_control(true, vehicle).map_err(|e| {
            AppError::SessionInit(format!("api control refused for '{vehicle}': {e}"))
        })?;
        let mut controls = sim.get_car_controls(vehicle).map_err(|e| {
            AppError::SessionInit(format!("cannot read controls of '{vehicle}': {e}"))
        })?;
        controls.is_manual_gear = true;

        info!(vehicle, "vehicle session established");

        Ok(Self {
            sim,
            options,
            controls,
        })
    }

    /// Write `cmd` onto the control object and push it to the simulator.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Simulator`] if the simulator rejects the controls.
    pub fn apply_command(&mut self, cmd: &ControlCommand) -> Result<()> {
        self.controls.manual_gear = cmd.direction.manual_gear();
        self.controls.throttle = cmd.throttle;
        self.controls.steering = cmd.steering;
        self.controls.brake = cmd.brake_value();

        self.sim
            .set_car_controls(&self.controls, &self.options.vehicle)
            .map_err(|e| AppError::Simulator(format!("set controls failed: {e}")))
    }

    /// Read speed, orientation, and position from the simulator.
    ///
    /// The control object is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Simulator`] if any reading fails.
    pub fn sample_state(&mut self) -> Result<VehicleStateReport> {
        let vehicle = self.options.vehicle.as_str();

        let speed = self
            .sim
            .get_speed(vehicle)
            .map_err(|e| AppError::Simulator(format!("speed read failed: {e}")))?;
        let orientation = self
            .sim
            .get_imu_orientation(&self.options.imu_sensor, vehicle)
            .map_err(|e| AppError::Simulator(format!("imu read failed: {e}")))?;
        let position = self
            .sim
            .get_gps_position(&self.options.gps_sensor, vehicle)
            .map_err(|e| AppError::Simulator(format!("gps read failed: {e}")))?;

        let (pitch, roll, yaw) = orientation.to_euler_angles();

        Ok(VehicleStateReport {
            speed,
            latitude: position.latitude,
            longitude: position.longitude,
            pitch,
            roll,
            yaw,
        })
    }

    /// Ask the simulator to draw `waypoints` as persistent markers.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Simulator`] if the draw request is rejected.
    pub fn plot_waypoints(&mut self, waypoints: &WaypointSet) -> Result<()> {
        let markers = waypoints.to_markers(self.options.marker_height);
        self.sim
            .plot_points(&markers, &self.options.plot_style)
            .map_err(|e| AppError::Simulator(format!("plot points failed: {e}")))?;

        debug!(count = markers.len(), "waypoints plotted");
        Ok(())
    }

    /// Current control object as last pushed to the simulator.
    #[must_use]
    pub fn controls(&self) -> &CarControls {
        &self.controls
    }

    /// Options the session was opened with.
    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Borrow the underlying simulator.
    #[must_use]
    pub fn simulator(&self) -> &S {
        &self.sim
    }
}
