//! Frame-at-a-time I/O over a byte stream.
//!
//! [`FrameTransport`] owns one connection's stream and exposes the two
//! operations the connection loop needs: read the next request payload and
//! write one already-framed response. Read failures are classified so the
//! caller can tell a peer that hung up between frames from one that vanished
//! mid-frame.

use std::io;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;

use crate::codec::{CodecError, EofError, FramingError, RequestFrameCodec};

/// Errors raised while reading or writing frames.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer closed the stream cleanly between frames.
    #[error("connection closed")]
    ConnectionClosed,
    /// The stream ended part-way through a length prefix or payload.
    #[error("truncated frame: {0}")]
    TruncatedFrame(EofError),
    /// The declared length is negative or exceeds the ceiling.
    #[error("invalid frame length {length} (max {max})")]
    InvalidFrameLength {
        /// Length as declared on the wire.
        length: i32,
        /// Ceiling in force for this connection.
        max: usize,
    },
    /// Writing a response failed.
    #[error("write failure: {0}")]
    WriteFailure(#[source] io::Error),
    /// Reading from the stream failed.
    #[error("read failure: {0}")]
    Io(#[source] io::Error),
}

impl TransportError {
    /// Returns true if the peer closed the connection at a frame boundary.
    #[must_use]
    pub fn is_clean_close(&self) -> bool { matches!(self, Self::ConnectionClosed) }

    /// Short label used for logging and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionClosed => "connection_closed",
            Self::TruncatedFrame(_) => "truncated_frame",
            Self::InvalidFrameLength { .. } => "invalid_frame_length",
            Self::WriteFailure(_) => "write_failure",
            Self::Io(_) => "io",
        }
    }
}

impl From<CodecError> for TransportError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Eof(EofError::CleanClose) => Self::ConnectionClosed,
            CodecError::Eof(eof) => Self::TruncatedFrame(eof),
            CodecError::Framing(FramingError::InvalidFrameLength { length, max }) => {
                Self::InvalidFrameLength { length, max }
            }
            CodecError::Io(e) => Self::Io(e),
        }
    }
}

/// Reads request frames from, and writes response frames to, one stream.
///
/// # Examples
///
/// ```
/// use brokerwire::transport::{FrameTransport, TransportError};
/// use tokio::io::{AsyncWriteExt, duplex};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (mut client, server) = duplex(64);
/// client.write_all(&[0, 0, 0, 1, 0x2a]).await.unwrap();
/// drop(client);
///
/// let mut transport = FrameTransport::with_default_limit(server);
/// assert_eq!(&transport.read_frame().await.unwrap()[..], &[0x2a]);
/// assert!(matches!(
///     transport.read_frame().await,
///     Err(TransportError::ConnectionClosed)
/// ));
/// # }
/// ```
#[derive(Debug)]
pub struct FrameTransport<S> {
    framed: Framed<S, RequestFrameCodec>,
}

impl<S> FrameTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap `stream`, rejecting inbound frames above `max_frame_length`.
    #[must_use]
    pub fn new(stream: S, max_frame_length: usize) -> Self {
        Self {
            framed: Framed::new(stream, RequestFrameCodec::new(max_frame_length)),
        }
    }

    /// Wrap `stream` using the default 10 MiB ceiling.
    #[must_use]
    pub fn with_default_limit(stream: S) -> Self {
        Self {
            framed: Framed::new(stream, RequestFrameCodec::default()),
        }
    }

    /// Ceiling applied to inbound frames.
    #[must_use]
    pub fn max_frame_length(&self) -> usize { self.framed.codec().max_frame_length() }

    /// Read the next frame payload, without its length prefix.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ConnectionClosed`] on a clean close before
    /// any byte of a new frame, [`TransportError::TruncatedFrame`] if the
    /// stream ends mid-frame, [`TransportError::InvalidFrameLength`] for a
    /// negative or oversized length, and [`TransportError::Io`] for other
    /// read failures.
    pub async fn read_frame(&mut self) -> Result<Bytes, TransportError> {
        match self.framed.next().await {
            Some(Ok(payload)) => Ok(payload),
            Some(Err(e)) => Err(e.into()),
            None => Err(TransportError::ConnectionClosed),
        }
    }

    /// Write `frame` verbatim and flush it. The caller supplies the length
    /// prefix.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::WriteFailure`] if the underlying write or
    /// flush fails.
    pub async fn write_frame(&mut self, frame: Bytes) -> Result<(), TransportError> {
        self.framed
            .send(frame)
            .await
            .map_err(|e| TransportError::WriteFailure(e.into()))
    }

    /// Recover the underlying stream.
    pub fn into_inner(self) -> S { self.framed.into_inner() }
}
