//! Domain model module declarations.

pub mod command;
pub mod controls;
pub mod state;
pub mod waypoint;

pub use command::{ControlCommand, Direction};
pub use controls::{CarControls, GeoPoint, PlotStyle, Quaternion, Vector3};
pub use state::VehicleStateReport;
pub use waypoint::{Waypoint, WaypointSet};
