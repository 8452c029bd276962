//! Per-connection request/response loop.
//!
//! A connection is served strictly sequentially: read one request frame,
//! decode its header, dispatch it, write the response, repeat. The loop ends
//! when the peer closes the stream between frames, or on the first error.
//! Nothing is written for a request whose header cannot be decoded.

use std::net::SocketAddr;

use log::{debug, warn};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    config::ConnectionOptions,
    dispatch::Router,
    metrics::{self, Direction},
    protocol::{HeaderError, Request},
    transport::{FrameTransport, TransportError},
};

/// Reasons a connection loop stops.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Reading or writing a frame failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A request header could not be decoded.
    #[error(transparent)]
    Header(#[from] HeaderError),
}

impl ConnectionError {
    /// Returns true if the peer closed the stream at a frame boundary.
    #[must_use]
    pub fn is_clean_close(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_clean_close())
    }

    /// Short label used for logging and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(e) => e.kind(),
            Self::Header(_) => "malformed_header",
        }
    }
}

/// Serve requests on `stream` until the peer disconnects or an error occurs.
///
/// Returns the number of requests answered when the peer closes the stream
/// cleanly.
///
/// # Errors
///
/// Returns [`ConnectionError::Transport`] for truncated frames, invalid
/// frame lengths and I/O failures, and [`ConnectionError::Header`] for a
/// request whose header cannot be decoded. Responses already written remain
/// on the wire.
///
/// # Examples
///
/// ```
/// use brokerwire::{config::ConnectionOptions, connection::serve_connection, dispatch::Router};
/// use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (mut client, server) = duplex(256);
/// let router = Router::new();
/// let task = tokio::spawn(async move {
///     serve_connection(server, &router, ConnectionOptions::default()).await
/// });
///
/// // ApiVersions v4, correlation id 7, legacy client id "test"
/// client
///     .write_all(&[
///         0, 0, 0, 14, 0, 18, 0, 4, 0, 0, 0, 7, 0, 4, b't', b'e', b's', b't',
///     ])
///     .await
///     .unwrap();
/// let mut response = [0u8; 23];
/// client.read_exact(&mut response).await.unwrap();
/// assert_eq!(&response[4..8], &[0, 0, 0, 7]);
///
/// drop(client);
/// assert_eq!(task.await.unwrap().unwrap(), 1);
/// # }
/// ```
pub async fn serve_connection<S>(
    stream: S,
    router: &Router,
    options: ConnectionOptions,
) -> Result<u64, ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut transport = FrameTransport::new(stream, options.max_frame_length);
    let mut served = 0u64;
    loop {
        let payload = match transport.read_frame().await {
            Ok(payload) => payload,
            Err(e) if e.is_clean_close() => return Ok(served),
            Err(e) => return Err(e.into()),
        };
        metrics::inc_frames(Direction::Inbound);

        let request = Request::decode(&payload, options.header_strategy)?;
        let header = &request.header;
        debug!(
            "request received: api_key={}, api_version={}, correlation_id={}, client_id={:?}, \
             encoding={:?}, body_len={}",
            header.api_key,
            header.api_version,
            header.correlation_id,
            header.client_id,
            header.encoding,
            request.body.len()
        );

        let response = router.dispatch(&request);
        transport.write_frame(response).await?;
        metrics::inc_frames(Direction::Outbound);
        served += 1;
    }
}

/// Serve `stream` to completion, logging how the connection ended.
///
/// Errors are recorded and swallowed: one misbehaving peer never affects
/// other connections.
pub async fn handle_connection<S>(
    stream: S,
    peer_addr: Option<SocketAddr>,
    router: &Router,
    options: ConnectionOptions,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let _gauge = metrics::ConnectionGauge::acquire();
    match serve_connection(stream, router, options).await {
        Ok(served) => {
            debug!("connection closed by peer: peer_addr={peer_addr:?}, requests={served}");
        }
        Err(e) => {
            metrics::inc_errors(e.kind());
            warn!(
                "connection terminated with error: peer_addr={peer_addr:?}, kind={}, error={e}",
                e.kind()
            );
        }
    }
}
