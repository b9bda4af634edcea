//! Line transport between the bridge and the remote controller.
//!
//! The [`LineTransport`] trait is the seam the duplex controller talks to;
//! [`connection::LineConnection`] implements it over any split async byte
//! stream, typically a [`tokio::net::TcpStream`].

pub mod connection;

use std::future::Future;
use std::pin::Pin;

use crate::Result;

pub use connection::LineConnection;

/// A persistent duplex connection carrying newline-terminated text lines.
///
/// Reads and writes go through independent halves, so one task may block in
/// [`read_line`](LineTransport::read_line) while another calls
/// [`write_line`](LineTransport::write_line).
pub trait LineTransport: Send + Sync {
    /// Wait for the next complete line, without its terminator.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ConnectionClosed`](crate::AppError::ConnectionClosed)
    /// if the peer disconnected or the transport is closed, and
    /// [`AppError::Timeout`](crate::AppError::Timeout) if a read timeout is
    /// configured and elapses.
    fn read_line(&self) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>>;

    /// Send one line; the terminator is appended by the transport.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ConnectionClosed`](crate::AppError::ConnectionClosed)
    /// if the transport is closed or the peer has gone away.
    fn write_line(&self, line: String) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Release the connection. Calling this more than once is a no-op.
    fn close(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Whether [`close`](LineTransport::close) has been called.
    fn is_closed(&self) -> bool;
}
