//! Simulated vehicle access.
//!
//! The [`Simulator`] trait is the narrow capability set the bridge needs
//! from a driving simulator. [`session::VehicleSession`] layers the bridge's
//! operations on top of it; [`kinematic::KinematicSimulator`] is the
//! in-process implementation the binary ships with.

pub mod kinematic;
pub mod session;

use crate::models::{CarControls, GeoPoint, PlotStyle, Quaternion, Vector3};
use crate::Result;

pub use kinematic::KinematicSimulator;
pub use session::{SessionOptions, VehicleSession};

/// Capability set consumed from the simulator client.
///
/// Calls are synchronous and are only ever made while the caller holds the
/// vehicle session lock, so implementations need not be re-entrant.
///
/// All methods return [`AppError::Simulator`](crate::AppError::Simulator) on
/// failure.
pub trait Simulator: Send {
    /// Verify the simulator is reachable.
    ///
    /// # Errors
    ///
    /// Fails if the simulator does not answer.
    fn confirm_connection(&mut self) -> Result<()>;

    /// Request (or release) API control authority over `vehicle`.
    ///
    /// # Errors
    ///
    /// Fails if the vehicle is unknown or control is refused.
    fn enable_api_control(&mut self, enabled: bool, vehicle: &str) -> Result<()>;

    /// Fetch the current control object of `vehicle`.
    ///
    /// # Errors
    ///
    /// Fails if the vehicle is unknown.
    fn get_car_controls(&mut self, vehicle: &str) -> Result<CarControls>;

    /// Push `controls` to `vehicle`.
    ///
    /// # Errors
    ///
    /// Fails if the vehicle is unknown or not under API control.
    fn set_car_controls(&mut self, controls: &CarControls, vehicle: &str) -> Result<()>;

    /// Ground speed of `vehicle` in metres per second.
    ///
    /// # Errors
    ///
    /// Fails if the vehicle is unknown.
    fn get_speed(&mut self, vehicle: &str) -> Result<f64>;

    /// Orientation reported by the IMU named `sensor` on `vehicle`.
    ///
    /// # Errors
    ///
    /// Fails if the vehicle or sensor is unknown.
    fn get_imu_orientation(&mut self, sensor: &str, vehicle: &str) -> Result<Quaternion>;

    /// Position reported by the GPS named `sensor` on `vehicle`.
    ///
    /// # Errors
    ///
    /// Fails if the vehicle or sensor is unknown.
    fn get_gps_position(&mut self, sensor: &str, vehicle: &str) -> Result<GeoPoint>;

    /// Draw debug markers at `points`.
    ///
    /// # Errors
    ///
    /// Fails if the simulator rejects the request.
    fn plot_points(&mut self, points: &[Vector3], style: &PlotStyle) -> Result<()>;
}

impl<S: Simulator + ?Sized> Simulator for Box<S> {
    fn confirm_connection(&mut self) -> Result<()> {
        (**self).confirm_connection()
    }

    fn enable_api_control(&mut self, enabled: bool, vehicle: &str) -> Result<()> {
        (**self).enable_api_control(enabled, vehicle)
    }

    fn get_car_controls(&mut self, vehicle: &str) -> Result<CarControls> {
        (**self).get_car_controls(vehicle)
    }

    fn set_car_controls(&mut self, controls: &CarControls, vehicle: &str) -> Result<()> {
        (**self).set_car_controls(controls, vehicle)
    }

    fn get_speed(&mut self, vehicle: &str) -> Result<f64> {
        (**self).get_speed(vehicle)
    }

    fn get_imu_orientation(&mut self, sensor: &str, vehicle: &str) -> Result<Quaternion> {
        (**self).get_imu_orientation(sensor, vehicle)
    }

    fn get_gps_position(&mut self, sensor: &str, vehicle: &str) -> Result<GeoPoint> {
        (**self).get_gps_position(sensor, vehicle)
    }

    fn plot_points(&mut self, points: &[Vector3], style: &PlotStyle) -> Result<()> {
        (**self).plot_points(points, style)
    }
}
