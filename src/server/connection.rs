//! Connection task spawning for [`BrokerServer`](super::BrokerServer).

use std::{any::Any, fmt, net::SocketAddr};

use futures::FutureExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::task::TaskTracker;

use crate::{config::ConnectionOptions, connection::handle_connection, dispatch::Router};

/// Spawn a task to serve a single connection, logging and discarding any
/// panics so that other connections keep running.
pub(super) fn spawn_connection_task<S>(
    stream: S,
    peer_addr: Option<SocketAddr>,
    router: Router,
    options: ConnectionOptions,
    tracker: &TaskTracker,
) where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    tracker.spawn(async move {
        let fut = std::panic::AssertUnwindSafe(handle_connection(
            stream, peer_addr, &router, options,
        ))
        .catch_unwind();

        if let Err(panic) = fut.await {
            crate::metrics::inc_connection_panics();
            let panic_msg = PanicMessage(panic);
            tracing::error!(panic = %panic_msg, ?peer_addr, "connection task panicked");
        }
    });
}

/// Displays a panic payload, downcasting to `String` or `&'static str` when
/// possible.
struct PanicMessage(Box<dyn Any + Send>);

impl fmt::Display for PanicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.0.downcast_ref::<String>() {
            f.write_str(s)
        } else if let Some(s) = self.0.downcast_ref::<&'static str>() {
            f.write_str(s)
        } else {
            f.write_str("<non-string panic payload>")
        }
    }
}
