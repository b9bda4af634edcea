//! Encoding and decoding of the comma-separated wire messages.
//!
//! | Direction          | Line                                        |
//! |--------------------|---------------------------------------------|
//! | client → server    | `x1,y1,...,xn,yn` (handshake, once)         |
//! | client → server    | `throttle,steering,brake`                   |
//! | server → client    | `speed,latitude,longitude,pitch,roll,yaw`   |

use crate::models::{ControlCommand, VehicleStateReport, Waypoint, WaypointSet};
use crate::{AppError, Result};

/// Field delimiter shared by every message.
pub const FIELD_DELIMITER: char = ',';

/// Minimum number of fields in a command line.
pub const COMMAND_FIELDS: usize = 3;

/// Decode a `throttle,steering,brake` command line.
///
/// Fields are trimmed before parsing. Fields beyond the third are ignored.
/// The brake field is an integer where any non-zero value engages the brake;
/// a decimal such as `0.5` is accepted and treated the same way.
///
/// # Errors
///
/// Returns [`AppError::MalformedMessage`] if fewer than three fields are
/// present or any of the first three is not numeric.
pub fn decode_command(line: &str) -> Result<ControlCommand> {
    let fields: Vec<&str> = split_fields(line).collect();
    if fields.len() < COMMAND_FIELDS {
        return Err(AppError::MalformedMessage(format!(
            "command needs {COMMAND_FIELDS} fields, got {}",
            fields.len()
        )));
    }

    let throttle = parse_float(fields[0], "throttle")?;
    let steering = parse_float(fields[1], "steering")?;
    let brake_engaged = parse_brake(fields[2])?;

    Ok(ControlCommand::from_signed(throttle, steering, brake_engaged))
}

/// Render a state report as six comma-separated decimals.
///
/// Order is fixed: speed, latitude, longitude, pitch, roll, yaw.
#[must_use]
pub fn encode_state(report: &VehicleStateReport) -> String {
    report
        .fields()
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode the handshake line into an ordered waypoint set.
///
/// Fields are consumed pairwise as `(x, y)`. An empty or blank line yields
/// an empty set.
///
/// # Errors
///
/// Returns [`AppError::MalformedMessage`] if the field count is odd or any
/// field is not numeric.
pub fn decode_waypoints(line: &str) -> Result<WaypointSet> {
    if line.trim().is_empty() {
        return Ok(WaypointSet::default());
    }

    let values = split_fields(line)
        .map(|field| parse_float(field, "waypoint coordinate"))
        .collect::<Result<Vec<f64>>>()?;

    if values.len() % 2 != 0 {
        return Err(AppError::MalformedMessage(format!(
            "waypoint line has odd field count {}",
            values.len()
        )));
    }

    Ok(values
        .chunks_exact(2)
        .map(|pair| Waypoint::new(pair[0], pair[1]))
        .collect::<Vec<_>>()
        .into())
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.trim().split(FIELD_DELIMITER).map(str::trim)
}

fn parse_float(field: &str, name: &str) -> Result<f64> {
    field
        .parse::<f64>()
        .map_err(|e| AppError::MalformedMessage(format!("invalid {name} '{field}': {e}")))
}

fn parse_brake(field: &str) -> Result<bool> {
    if let Ok(value) = field.parse::<i64>() {
        return Ok(value != 0);
    }
    parse_float(field, "brake").map(|value| value != 0.0)
}
