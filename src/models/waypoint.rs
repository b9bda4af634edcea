//! Waypoint map received during the handshake.

use crate::models::controls::Vector3;

/// A 2D point forwarded to the simulator for visualization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    /// X coordinate in the simulator's local frame.
    pub x: f64,
    /// Y coordinate in the simulator's local frame.
    pub y: f64,
}

impl Waypoint {
    /// Construct a waypoint.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ordered waypoints parsed once from the handshake line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaypointSet(Vec<Waypoint>);

impl WaypointSet {
    /// Wrap an ordered list of waypoints.
    #[must_use]
    pub fn new(points: Vec<Waypoint>) -> Self {
        Self(points)
    }

    /// Number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set contains no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the waypoints in order.
    #[must_use]
    pub fn points(&self) -> &[Waypoint] {
        &self.0
    }

    /// Lift every waypoint to a 3D marker at height `z`.
    #[must_use]
    pub fn to_markers(&self, z: f64) -> Vec<Vector3> {
        self.0
            .iter()
            .map(|p| Vector3 { x: p.x, y: p.y, z })
            .collect()
    }
}

impl From<Vec<Waypoint>> for WaypointSet {
    fn from(points: Vec<Waypoint>) -> Self {
        Self(points)
    }
}
