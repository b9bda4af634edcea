//! Outbound vehicle state model.

/// Snapshot of the vehicle reported back to the controller.
///
/// Angles are in radians; speed is in metres per second.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VehicleStateReport {
    /// Ground speed.
    pub speed: f64,
    /// GPS latitude in degrees.
    pub latitude: f64,
    /// GPS longitude in degrees.
    pub longitude: f64,
    /// Pitch from the IMU orientation.
    pub pitch: f64,
    /// Roll from the IMU orientation.
    pub roll: f64,
    /// Yaw from the IMU orientation.
    pub yaw: f64,
}

impl VehicleStateReport {
    /// Field values in wire order.
    #[must_use]
    pub fn fields(&self) -> [f64; 6] {
        [
            self.speed,
            self.latitude,
            self.longitude,
            self.pitch,
            self.roll,
            self.yaw,
        ]
    }
}
