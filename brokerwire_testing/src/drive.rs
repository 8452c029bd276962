//! In-memory driving of a single connection.

use std::io;

use brokerwire::{
    config::ConnectionOptions,
    connection::{ConnectionError, serve_connection},
    dispatch::Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

/// Duplex buffer size used by [`drive_connection`].
pub const DEFAULT_CAPACITY: usize = 4096;

/// Outcome of serving a scripted connection.
#[derive(Debug)]
pub struct ConnectionRun {
    /// Value returned by the connection loop.
    pub result: Result<u64, ConnectionError>,
    /// Every byte the server wrote before the connection ended.
    pub output: Vec<u8>,
}

/// Serve `frames` to a connection loop over a duplex stream and collect the
/// output.
///
/// Each element of `frames` is written verbatim, in order, then the client
/// shuts down its write half. If the connection loop panics, the panic is
/// surfaced as an `io::Error` beginning with `"server task failed"`.
///
/// # Errors
///
/// Returns an `io::Error` if writing to or reading from the duplex stream
/// fails, or if the server task panics.
pub async fn drive_connection(
    router: Router,
    options: ConnectionOptions,
    frames: Vec<Vec<u8>>,
) -> io::Result<ConnectionRun> {
    drive_connection_with_capacity(router, options, frames, DEFAULT_CAPACITY).await
}

/// Variant of [`drive_connection`] with an explicit duplex capacity.
///
/// # Errors
///
/// See [`drive_connection`].
pub async fn drive_connection_with_capacity(
    router: Router,
    options: ConnectionOptions,
    frames: Vec<Vec<u8>>,
    capacity: usize,
) -> io::Result<ConnectionRun> {
    let (mut client, server) = duplex(capacity);

    let server_fut = async {
        use futures::FutureExt as _;
        std::panic::AssertUnwindSafe(serve_connection(server, &router, options))
            .catch_unwind()
            .await
            .map_err(|panic| {
                let msg = panic
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "<non-string panic payload>".to_owned());
                io::Error::other(format!("server task failed: {msg}"))
            })
    };

    let client_fut = async {
        for frame in &frames {
            // A server that bails out early closes its half; stop writing.
            if client.write_all(frame).await.is_err() {
                break;
            }
        }
        let _ = client.shutdown().await;

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).await?;
        io::Result::Ok(buf)
    };

    let (result, output) = tokio::try_join!(server_fut, client_fut)?;
    Ok(ConnectionRun { result, output })
}
