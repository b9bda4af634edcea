//! Newline framing for the bridge wire protocol.
//!
//! Wraps [`tokio_util::codec::LinesCodec`] with a configurable maximum line
//! length so an unterminated line from a misbehaving controller cannot grow
//! the read buffer without bound.
//!
//! Use [`LineCodec`] as the codec parameter for
//! [`tokio_util::codec::FramedRead`] (inbound) and
//! [`tokio_util::codec::FramedWrite`] (outbound). Lines are UTF-8, delimited
//! by `\n`; a trailing `\r` is stripped on decode.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};
use tracing::{debug, warn};

use crate::{AppError, Result};

/// Default maximum inbound line length in bytes.
pub const DEFAULT_MAX_LINE_BYTES: usize = 65_536;

/// Line codec for the controller connection.
///
/// # Decoder
///
/// Inbound lines longer than the configured limit, and lines that are not
/// valid UTF-8, are discarded up to the next newline and logged at `WARN`;
/// they never reach the caller. Decoding an error would end the
/// [`FramedRead`](tokio_util::codec::FramedRead) stream, which the bridge
/// would read as a disconnect. Other I/O errors map to [`AppError::Io`].
///
/// At EOF an unterminated trailing fragment is dropped rather than returned,
/// so callers only ever see complete lines.
///
/// # Encoder
///
/// Outbound strings are encoded as `item\n`.
#[derive(Debug)]
pub struct LineCodec {
    inner: LinesCodec,
    max_length: usize,
}

impl LineCodec {
    /// Create a codec with the [`DEFAULT_MAX_LINE_BYTES`] limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LINE_BYTES)
    }

    /// Create a codec rejecting inbound lines longer than `max_length` bytes.
    #[must_use]
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_length),
            max_length,
        }
    }

    /// Configured inbound line limit.
    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = AppError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        loop {
            match self.inner.decode(src) {
                Ok(line) => return Ok(line),
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    warn!(
                        max_length = self.max_length,
                        "line codec: line too long, discarding"
                    );
                }
                Err(LinesCodecError::Io(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
                    warn!(error = %e, "line codec: invalid utf-8, discarding line");
                }
                Err(LinesCodecError::Io(e)) => return Err(AppError::Io(e.to_string())),
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        let line = self.decode(src)?;
        if line.is_none() && !src.is_empty() {
            debug!(
                bytes = src.len(),
                "line codec: dropping unterminated fragment at eof"
            );
            src.clear();
        }
        Ok(line)
    }
}

impl Encoder<String> for LineCodec {
    type Error = AppError;

    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<()> {
        self.inner.encode(item, dst).map_err(map_codec_error)
    }
}

// ── Private helper ────────────────────────────────────────────────────────────

/// Map a [`LinesCodecError`] raised while encoding to an [`AppError`].
fn map_codec_error(e: LinesCodecError) -> AppError {
    match e {
        LinesCodecError::MaxLineLengthExceeded => {
            AppError::MalformedMessage("outbound line too long".into())
        }
        LinesCodecError::Io(io_err) => AppError::Io(io_err.to_string()),
    }
}
