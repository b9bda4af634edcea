//! Unit tests for the command, state, and waypoint wire messages.

use vehicle_bridge::models::{Direction, VehicleStateReport, Waypoint};
use vehicle_bridge::protocol::{decode_command, decode_waypoints, encode_state};
use vehicle_bridge::AppError;

// ── Commands ──────────────────────────────────────────────────────────────────

/// Sign of the raw throttle selects the direction; magnitude is kept.
#[test]
fn command_direction_follows_throttle_sign() {
    let cases = [
        ("1.0,0.2,0", Direction::Forward, 1.0, 0.2, false),
        ("-0.5,0,1", Direction::Reverse, 0.5, 0.0, true),
        ("0,-1,0", Direction::Forward, 0.0, -1.0, false),
        ("-0.001,0.75,7", Direction::Reverse, 0.001, 0.75, true),
        ("0.25,0,-1", Direction::Forward, 0.25, 0.0, true),
    ];

    for (line, direction, throttle, steering, brake) in cases {
        let cmd = decode_command(line).expect("valid command");
        assert_eq!(cmd.direction, direction, "direction for {line}");
        assert!((cmd.throttle - throttle).abs() < f64::EPSILON, "throttle for {line}");
        assert!((cmd.steering - steering).abs() < f64::EPSILON, "steering for {line}");
        assert_eq!(cmd.brake_engaged, brake, "brake for {line}");
        assert!(cmd.throttle >= 0.0, "magnitude is never negative");
    }
}

#[test]
fn command_fields_are_trimmed() {
    let cmd = decode_command(" 0.4 , -0.2 , 1 ").expect("whitespace is tolerated");
    assert!((cmd.throttle - 0.4).abs() < f64::EPSILON);
    assert!((cmd.steering + 0.2).abs() < f64::EPSILON);
    assert!(cmd.brake_engaged);
}

#[test]
fn command_extra_fields_are_ignored() {
    let cmd = decode_command("0.4,0,0,99,foo").expect("extra fields ignored");
    assert!((cmd.throttle - 0.4).abs() < f64::EPSILON);
    assert!(!cmd.brake_engaged);
}

#[test]
fn decimal_brake_is_accepted() {
    assert!(decode_command("0,0,0.5").unwrap().brake_engaged);
    assert!(!decode_command("0,0,0.0").unwrap().brake_engaged);
}

#[test]
fn short_command_is_malformed() {
    for line in ["", "1.0", "1.0,0.2", ","] {
        let err = decode_command(line).expect_err("fewer than three fields");
        assert!(err.is_malformed(), "{line:?} gave {err:?}");
    }
}

#[test]
fn non_numeric_command_is_malformed() {
    for line in ["fast,0,0", "0,left,0", "0,0,on", "0,,0"] {
        let err = decode_command(line).expect_err("non-numeric field");
        assert!(matches!(err, AppError::MalformedMessage(_)), "{line:?} gave {err:?}");
    }
}

// ── State ─────────────────────────────────────────────────────────────────────

/// Six fields in the order speed, latitude, longitude, pitch, roll, yaw.
#[test]
fn state_encodes_six_fields_in_order() {
    let report = VehicleStateReport {
        speed: 12.5,
        latitude: 47.641_468,
        longitude: -122.140_165,
        pitch: -0.01,
        roll: 0.002,
        yaw: 1.5,
    };

    let line = encode_state(&report);
    let fields: Vec<f64> = line
        .split(',')
        .map(|f| f.parse().expect("numeric field"))
        .collect();

    assert_eq!(fields, vec![12.5, 47.641_468, -122.140_165, -0.01, 0.002, 1.5]);
    assert!(!line.ends_with('\n'), "framing adds the newline");
}

#[test]
fn state_of_stationary_vehicle() {
    assert_eq!(encode_state(&VehicleStateReport::default()), "0,0,0,0,0,0");
}

// ── Waypoints ─────────────────────────────────────────────────────────────────

#[test]
fn waypoints_decode_pairwise_in_order() {
    let set = decode_waypoints("0,0,1,1,2.5,-3").expect("valid waypoints");
    assert_eq!(
        set.points(),
        &[
            Waypoint::new(0.0, 0.0),
            Waypoint::new(1.0, 1.0),
            Waypoint::new(2.5, -3.0),
        ]
    );
}

#[test]
fn blank_waypoint_line_is_empty_set() {
    assert!(decode_waypoints("").unwrap().is_empty());
    assert!(decode_waypoints("   ").unwrap().is_empty());
}

#[test]
fn odd_waypoint_field_count_is_malformed() {
    let err = decode_waypoints("0,0,1").expect_err("dangling x");
    assert!(err.is_malformed(), "got {err:?}");
}

#[test]
fn non_numeric_waypoint_is_malformed() {
    let err = decode_waypoints("0,0,a,1").expect_err("non-numeric");
    assert!(err.is_malformed(), "got {err:?}");
}
