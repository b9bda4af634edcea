//! Inbound control command model.

/// Travel direction selected by the sign of the raw throttle input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Non-negative throttle input.
    #[default]
    Forward,
    /// Negative throttle input.
    Reverse,
}

impl Direction {
    /// Manual gear index the simulator expects for this direction.
    #[must_use]
    pub fn manual_gear(self) -> i32 {
        match self {
            Self::Forward => 1,
            Self::Reverse => -1,
        }
    }
}

/// A single actuation request decoded from one command line.
///
/// Commands are transient: decoded, applied to the vehicle session, then
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlCommand {
    /// Throttle magnitude, always `>= 0`.
    pub throttle: f64,
    /// Direction derived from the sign of the raw throttle.
    pub direction: Direction,
    /// Steering input as sent by the controller.
    pub steering: f64,
    /// Whether the brake is engaged.
    pub brake_engaged: bool,
}

impl ControlCommand {
    /// Build a command from the signed throttle input.
    ///
    /// A negative `raw_throttle` selects [`Direction::Reverse`]; the stored
    /// throttle is its absolute value.
    #[must_use]
    pub fn from_signed(raw_throttle: f64, steering: f64, brake_engaged: bool) -> Self {
        let direction = if raw_throttle < 0.0 {
            Direction::Reverse
        } else {
            Direction::Forward
        };

        Self {
            throttle: raw_throttle.abs(),
            direction,
            steering,
            brake_engaged,
        }
    }

    /// Brake actuation value written to the control object.
    #[must_use]
    pub fn brake_value(&self) -> f64 {
        if self.brake_engaged {
            1.0
        } else {
            0.0
        }
    }
}
