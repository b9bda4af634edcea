//! Simulator-facing value types: the vehicle control object and sensor readings.

/// The vehicle's current actuation targets.
///
/// Mutated in place by the vehicle session and pushed back to the simulator
/// after every applied command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarControls {
    /// Throttle magnitude in `0.0..=1.0`.
    pub throttle: f64,
    /// Normalized steering in `-1.0..=1.0`.
    pub steering: f64,
    /// Brake amount in `0.0..=1.0`.
    pub brake: f64,
    /// Whether the gearbox follows `manual_gear`.
    pub is_manual_gear: bool,
    /// Selected gear; negative values reverse.
    pub manual_gear: i32,
}

impl Default for CarControls {
    fn default() -> Self {
        Self {
            throttle: 0.0,
            steering: 0.0,
            brake: 0.0,
            is_manual_gear: false,
            manual_gear: 0,
        }
    }
}

/// Orientation reported by the IMU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    /// Scalar part.
    pub w: f64,
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// The zero rotation.
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Rotation of `yaw` radians about the vertical axis.
    #[must_use]
    pub fn from_yaw(yaw: f64) -> Self {
        let half = yaw / 2.0;
        Self {
            w: half.cos(),
            x: 0.0,
            y: 0.0,
            z: half.sin(),
        }
    }

    /// Convert to `(pitch, roll, yaw)` in radians.
    ///
    /// The `asin` argument for pitch is clamped to `[-1, 1]` so slightly
    /// denormalized quaternions near gimbal lock still yield `±π/2`.
    #[must_use]
    pub fn to_euler_angles(&self) -> (f64, f64, f64) {
        let Self { w, x, y, z } = *self;
        let ysqr = y * y;

        let t0 = 2.0 * (w * x + y * z);
        let t1 = 1.0 - 2.0 * (x * x + ysqr);
        let roll = t0.atan2(t1);

        let t2 = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0);
        let pitch = t2.asin();

        let t3 = 2.0 * (w * z + x * y);
        let t4 = 1.0 - 2.0 * (ysqr + z * z);
        let yaw = t3.atan2(t4);

        (pitch, roll, yaw)
    }
}

/// Geodetic position reported by the GPS sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude in metres.
    pub altitude: f64,
}

/// A point in the simulator's local frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

/// Appearance of debug markers drawn by the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotStyle {
    /// Marker colour as RGBA in `0.0..=1.0`.
    pub color_rgba: [f32; 4],
    /// Marker size in pixels.
    pub size: f32,
    /// Seconds the markers stay visible; negative means forever.
    pub duration: f32,
    /// Whether the markers survive a simulator flush.
    pub persistent: bool,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            color_rgba: [1.0, 0.0, 0.0, 0.0],
            size: 5.0,
            duration: -1.0,
            persistent: true,
        }
    }
}
