//! Bridge wire protocol.
//!
//! - `codec`: [`LinesCodec`](tokio_util::codec::LinesCodec)-based newline framing
//!   with a maximum line length.
//! - `messages`: comma-separated command, state, and waypoint messages.

pub mod codec;
pub mod messages;

pub use codec::LineCodec;
pub use messages::{decode_command, decode_waypoints, encode_state};
