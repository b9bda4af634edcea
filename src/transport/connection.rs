//! [`LineTransport`] over a split async byte stream.
//!
//! The read half is driven by [`FramedRead`] and the write half by
//! [`FramedWrite`], both backed by [`LineCodec`]. Each half sits behind its
//! own async mutex so the receive and send loops never contend with each
//! other for the socket.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::debug;

use crate::protocol::LineCodec;
use crate::transport::LineTransport;
use crate::{AppError, Result};

/// A newline-delimited connection to the remote controller.
#[derive(Debug)]
pub struct LineConnection<R, W> {
    reader: Mutex<FramedRead<R, LineCodec>>,
    writer: Mutex<FramedWrite<W, LineCodec>>,
    read_timeout: Option<Duration>,
    closed: AtomicBool,
    peer: String,
}

impl LineConnection<OwnedReadHalf, OwnedWriteHalf> {
    /// Wrap an accepted TCP stream.
    ///
    /// Nagle's algorithm is disabled so each state line leaves immediately.
    #[must_use]
    pub fn from_tcp(stream: TcpStream, max_line_bytes: usize) -> Self {
        let peer = stream
            .peer_addr()
            .map_or_else(|_| "unknown".to_owned(), |addr| addr.to_string());
        if let Err(err) = stream.set_nodelay(true) {
            debug!(%err, peer, "line connection: failed to set TCP_NODELAY");
        }

        let (read_half, write_half) = stream.into_split();
        Self::new(read_half, write_half, max_line_bytes).with_peer(peer)
    }
}

impl<R, W> LineConnection<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Build a connection from independent read and write halves.
    #[must_use]
    pub fn new(reader: R, writer: W, max_line_bytes: usize) -> Self {
        let framed_read = FramedRead::new(reader, LineCodec::with_max_length(max_line_bytes));
        let framed_write = FramedWrite::new(writer, LineCodec::with_max_length(max_line_bytes));
        Self {
            reader: Mutex::new(framed_read),
            writer: Mutex::new(framed_write),
            read_timeout: None,
            closed: AtomicBool::new(false),
            peer: "local".to_owned(),
        }
    }

    /// Fail reads that take longer than `timeout`. `None` waits forever.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Label used for the remote end in log output.
    #[must_use]
    pub fn with_peer(mut self, peer: impl Into<String>) -> Self {
        self.peer = peer.into();
        self
    }

    /// Label of the remote end.
    #[must_use]
    pub fn peer(&self) -> &str {
        &self.peer
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(AppError::ConnectionClosed("transport already closed".into()))
        } else {
            Ok(())
        }
    }

    async fn next_line(&self) -> Result<String> {
        self.ensure_open()?;
        let mut framed = self.reader.lock().await;

        let item = match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, framed.next())
                .await
                .map_err(|_| AppError::Timeout(format!("no line received within {limit:?}")))?,
            None => framed.next().await,
        };

        match item {
            Some(Ok(line)) => Ok(line),
            Some(Err(e)) => {
                debug!(peer = %self.peer, error = %e, "line connection: read failed");
                Err(AppError::ConnectionClosed(format!("read failed: {e}")))
            }
            None => {
                debug!(peer = %self.peer, "line connection: EOF detected");
                Err(AppError::ConnectionClosed("peer disconnected".into()))
            }
        }
    }

    async fn send_line(&self, line: String) -> Result<()> {
        self.ensure_open()?;
        let mut framed = self.writer.lock().await;

        framed.send(line).await.map_err(|e| {
            debug!(peer = %self.peer, error = %e, "line connection: write failed");
            AppError::ConnectionClosed(format!("write failed: {e}"))
        })
    }

    async fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let mut framed = self.writer.lock().await;
        // The peer may already be gone; a failed flush is expected then.
        if let Err(e) = framed.close().await {
            debug!(peer = %self.peer, error = %e, "line connection: close flush failed");
        }
        debug!(peer = %self.peer, "line connection: closed");
    }
}

impl<R, W> LineTransport for LineConnection<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    fn read_line(&self) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        Box::pin(self.next_line())
    }

    fn write_line(&self, line: String) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(self.send_line(line))
    }

    fn close(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(self.shutdown())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
