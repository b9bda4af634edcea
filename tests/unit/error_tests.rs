//! Unit tests for `AppError` display format and classification.

use vehicle_bridge::AppError;

#[test]
fn display_uses_kind_prefix() {
    let cases = [
        (AppError::Config("x".into()), "config: x"),
        (AppError::Io("x".into()), "io: x"),
        (AppError::SessionInit("x".into()), "session init: x"),
        (AppError::Handshake("x".into()), "handshake: x"),
        (AppError::ConnectionClosed("x".into()), "connection closed: x"),
        (AppError::MalformedMessage("x".into()), "malformed message: x"),
        (AppError::Simulator("x".into()), "simulator: x"),
        (AppError::Timeout("x".into()), "timeout: x"),
    ];

    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
fn error_message_no_trailing_period() {
    let err = AppError::Handshake("peer disconnected before waypoints".into());
    let s = err.to_string();
    assert!(!s.ends_with('.'), "error message must not end with a period: {s}");
}

#[test]
fn only_connection_closed_is_a_clean_stop() {
    assert!(AppError::ConnectionClosed("eof".into()).is_connection_closed());
    assert!(!AppError::Timeout("eof".into()).is_connection_closed());
    assert!(!AppError::Io("eof".into()).is_connection_closed());
}

#[test]
fn only_malformed_message_is_skippable() {
    assert!(AppError::MalformedMessage("bad".into()).is_malformed());
    assert!(!AppError::Handshake("bad".into()).is_malformed());
}

#[test]
fn toml_error_converts_to_config() {
    let toml_err = toml::from_str::<toml::Table>("= nope").expect_err("invalid toml");
    let err: AppError = toml_err.into();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn io_error_converts_to_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "socket gone");
    let err: AppError = io_err.into();
    assert!(matches!(err, AppError::Io(_)), "got {err:?}");
    assert_eq!(err.to_string(), "io: socket gone");
}

#[test]
fn implements_std_error() {
    fn assert_error<E: std::error::Error>(_: &E) {}
    assert_error(&AppError::Io("x".into()));
}
