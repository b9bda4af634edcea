#![forbid(unsafe_code)]

//! `vehicle-bridge`: streams control commands from a remote controller into
//! a simulated vehicle and vehicle state back out, over one TCP connection.

pub mod bridge;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod protocol;
pub mod transport;
pub mod vehicle;

pub use config::BridgeConfig;
pub use errors::{AppError, Result};
