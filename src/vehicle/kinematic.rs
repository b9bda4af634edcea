//! In-process kinematic car simulator.
//!
//! A kinematic bicycle model on flat ground. State is integrated against a
//! monotonic clock each time the simulator is queried, so the car keeps
//! moving between calls exactly as a free-running simulator would.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, info};

use crate::models::{CarControls, GeoPoint, PlotStyle, Quaternion, Vector3};
use crate::vehicle::Simulator;
use crate::{AppError, Result};

/// WGS-84 equatorial radius in metres.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Longest step integrated at once; longer gaps are split.
const MAX_STEP: Duration = Duration::from_millis(50);

/// Vehicle and placement parameters for [`KinematicSimulator`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct KinematicParams {
    /// Distance between axles in metres.
    pub wheelbase_m: f64,
    /// Road-wheel angle at full steering input, in degrees.
    pub max_steering_deg: f64,
    /// Acceleration at full throttle (m/s²).
    pub max_acceleration: f64,
    /// Deceleration at full brake (m/s²).
    pub brake_deceleration: f64,
    /// Speed-proportional drag coefficient (1/s).
    pub drag: f64,
    /// Speed limit in m/s.
    pub max_speed: f64,
    /// Latitude of the local origin in degrees.
    pub origin_latitude: f64,
    /// Longitude of the local origin in degrees.
    pub origin_longitude: f64,
    /// Altitude of the local origin in metres.
    pub origin_altitude: f64,
}

impl Default for KinematicParams {
    fn default() -> Self {
        Self {
            wheelbase_m: 2.7,
            max_steering_deg: 35.0,
            max_acceleration: 4.0,
            brake_deceleration: 8.0,
            drag: 0.05,
            max_speed: 30.0,
            origin_latitude: 35.0,
            origin_longitude: 139.0,
            origin_altitude: 0.0,
        }
    }
}

/// Pose and velocity of the simulated car in the local north/east frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KinematicState {
    /// Metres north of the origin.
    pub north: f64,
    /// Metres east of the origin.
    pub east: f64,
    /// Heading in radians, clockwise from north.
    pub yaw: f64,
    /// Signed speed along the heading; negative while reversing.
    pub speed: f64,
}

/// A single simulated car with one IMU and one GPS sensor.
#[derive(Debug)]
pub struct KinematicSimulator {
    params: KinematicParams,
    vehicle: String,
    imu_sensor: String,
    gps_sensor: String,
    api_control: bool,
    controls: CarControls,
    state: KinematicState,
    markers: Vec<Vector3>,
    last_update: Option<Instant>,
    realtime: bool,
}

impl KinematicSimulator {
    /// Create a simulator hosting `vehicle` with the named sensors.
    #[must_use]
    pub fn new(
        params: KinematicParams,
        vehicle: impl Into<String>,
        imu_sensor: impl Into<String>,
        gps_sensor: impl Into<String>,
    ) -> Self {
        Self {
            params,
            vehicle: vehicle.into(),
            imu_sensor: imu_sensor.into(),
            gps_sensor: gps_sensor.into(),
            api_control: false,
            controls: CarControls::default(),
            state: KinematicState::default(),
            markers: Vec::new(),
            last_update: None,
            realtime: true,
        }
    }

    /// Stop advancing with wall-clock time; only [`step`](Self::step) moves
    /// the car.
    #[must_use]
    pub fn manual_clock(mut self) -> Self {
        self.realtime = false;
        self
    }

    /// Integrate the model forward by `dt`.
    pub fn step(&mut self, dt: Duration) {
        let mut remaining = dt;
        while !remaining.is_zero() {
            let slice = remaining.min(MAX_STEP);
            self.integrate(slice.as_secs_f64());
            remaining -= slice;
        }
    }

    /// Current pose and velocity.
    #[must_use]
    pub fn state(&self) -> KinematicState {
        self.state
    }

    /// Controls most recently accepted from the client.
    #[must_use]
    pub fn controls(&self) -> &CarControls {
        &self.controls
    }

    /// Every marker plotted so far, in request order.
    #[must_use]
    pub fn markers(&self) -> &[Vector3] {
        &self.markers
    }

    /// Whether API control is currently enabled.
    #[must_use]
    pub fn api_control_enabled(&self) -> bool {
        self.api_control
    }

    fn advance(&mut self) {
        if !self.realtime {
            return;
        }
        let now = Instant::now();
        if let Some(last) = self.last_update.replace(now) {
            self.step(now.saturating_duration_since(last));
        }
    }

    fn integrate(&mut self, dt: f64) {
        let p = &self.params;
        let c = &self.controls;
        let s = &mut self.state;

        let gear_sign = match c.manual_gear {
            g if g > 0 => 1.0,
            g if g < 0 => -1.0,
            _ => 0.0,
        };
        let throttle = c.throttle.clamp(0.0, 1.0);
        let brake = c.brake.clamp(0.0, 1.0);

        let drive = throttle * p.max_acceleration * gear_sign;
        let mut speed = s.speed + (drive - p.drag * s.speed) * dt;

        // Braking opposes motion and never reverses it.
        let brake_dv = brake * p.brake_deceleration * dt;
        if speed > 0.0 {
            speed = (speed - brake_dv).max(0.0);
        } else if speed < 0.0 {
            speed = (speed + brake_dv).min(0.0);
        }
        speed = speed.clamp(-p.max_speed, p.max_speed);

        let wheel_angle = c.steering.clamp(-1.0, 1.0) * p.max_steering_deg.to_radians();
        let yaw_rate = speed / p.wheelbase_m * wheel_angle.tan();

        s.yaw = wrap_angle(s.yaw + yaw_rate * dt);
        s.north += speed * s.yaw.cos() * dt;
        s.east += speed * s.yaw.sin() * dt;
        s.speed = speed;
    }

    fn check_vehicle(&self, vehicle: &str) -> Result<()> {
        if vehicle == self.vehicle {
            Ok(())
        } else {
            Err(AppError::Simulator(format!("unknown vehicle '{vehicle}'")))
        }
    }

    fn check_sensor(expected: &str, sensor: &str) -> Result<()> {
        if sensor == expected {
            Ok(())
        } else {
            Err(AppError::Simulator(format!("unknown sensor '{sensor}'")))
        }
    }
}

impl Simulator for KinematicSimulator {
    fn confirm_connection(&mut self) -> Result<()> {
        info!(vehicle = %self.vehicle, "kinematic simulator ready");
        Ok(())
    }

    fn enable_api_control(&mut self, enabled: bool, vehicle: &str) -> Result<()> {
        self.check_vehicle(vehicle)?;
        self.api_control = enabled;
        if enabled && self.last_update.is_none() {
            self.last_update = Some(Instant::now());
        }
        Ok(())
    }

    fn get_car_controls(&mut self, vehicle: &str) -> Result<CarControls> {
        self.check_vehicle(vehicle)?;
        Ok(self.controls)
    }

    fn set_car_controls(&mut self, controls: &CarControls, vehicle: &str) -> Result<()> {
        self.check_vehicle(vehicle)?;
        if !self.api_control {
            return Err(AppError::Simulator(format!(
                "api control is not enabled for '{vehicle}'"
            )));
        }
        self.advance();
        self.controls = *controls;
        Ok(())
    }

    fn get_speed(&mut self, vehicle: &str) -> Result<f64> {
        self.check_vehicle(vehicle)?;
        self.advance();
        Ok(self.state.speed.abs())
    }

    fn get_imu_orientation(&mut self, sensor: &str, vehicle: &str) -> Result<Quaternion> {
        self.check_vehicle(vehicle)?;
        Self::check_sensor(&self.imu_sensor, sensor)?;
        self.advance();
        Ok(Quaternion::from_yaw(self.state.yaw))
    }

    fn get_gps_position(&mut self, sensor: &str, vehicle: &str) -> Result<GeoPoint> {
        self.check_vehicle(vehicle)?;
        Self::check_sensor(&self.gps_sensor, sensor)?;
        self.advance();

        let p = &self.params;
        let lat0 = p.origin_latitude.to_radians();
        Ok(GeoPoint {
            latitude: p.origin_latitude + (self.state.north / EARTH_RADIUS_M).to_degrees(),
            longitude: p.origin_longitude
                + (self.state.east / (EARTH_RADIUS_M * lat0.cos())).to_degrees(),
            altitude: p.origin_altitude,
        })
    }

    fn plot_points(&mut self, points: &[Vector3], style: &PlotStyle) -> Result<()> {
        debug!(
            count = points.len(),
            size = style.size,
            persistent = style.persistent,
            "kinematic simulator: plotting markers"
        );
        if !style.persistent {
            self.markers.clear();
        }
        self.markers.extend_from_slice(points);
        Ok(())
    }
}

/// Wrap an angle into `(-π, π]`.
fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}
