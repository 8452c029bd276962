//! Accept-loop utilities for server runtime.

use std::{io, net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use log::{debug, warn};
use tokio::{
    net::{TcpListener, TcpStream},
    select,
    time::{Duration, sleep},
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    config::{BackoffConfig, ConnectionOptions},
    dispatch::Router,
    metrics,
    server::{ServerError, connection::spawn_connection_task},
};

/// Abstraction for sources of incoming connections consumed by the accept loop.
///
/// Implementations must be cancellation-safe: dropping a pending `accept()`
/// future must not leak resources.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub(in crate::server) trait AcceptListener: Send + Sync {
    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)>;
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

#[async_trait]
impl AcceptListener for TcpListener {
    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> { TcpListener::local_addr(self) }
}

#[derive(Debug)]
pub(in crate::server) struct AcceptLoopOptions {
    pub router: Router,
    pub connection: ConnectionOptions,
    pub shutdown: CancellationToken,
    pub tracker: TaskTracker,
    pub backoff: BackoffConfig,
}

/// Accepts incoming connections and spawns handler tasks.
///
/// Each accepted stream is served by its own tracked task sharing
/// `options.router`. Failures to accept trigger an exponential back-off
/// governed by `options.backoff`; a successful accept resets the delay. The
/// loop terminates when `options.shutdown` is cancelled.
pub(in crate::server) async fn accept_loop<L>(listener: Arc<L>, options: AcceptLoopOptions)
where
    L: AcceptListener + 'static,
{
    let backoff = options.backoff.normalized();
    debug_assert!(
        backoff.initial_delay <= backoff.max_delay,
        "BackoffConfig invariant violated: initial_delay > max_delay"
    );
    let mut delay = backoff.initial_delay;
    while let Some(next_delay) = accept_iteration(&listener, &options, &backoff, delay).await {
        delay = next_delay;
    }
}

#[expect(
    clippy::integer_division_remainder_used,
    reason = "tokio::select! expands to modulus internally"
)]
async fn accept_iteration<L>(
    listener: &Arc<L>,
    options: &AcceptLoopOptions,
    backoff: &BackoffConfig,
    delay: Duration,
) -> Option<Duration>
where
    L: AcceptListener + 'static,
{
    select! {
        biased;

        () = options.shutdown.cancelled() => None,
        res = listener.accept() => Some(match res {
            Ok((stream, peer_addr)) => {
                debug!("connection accepted: peer_addr={peer_addr}");
                spawn_connection_task(
                    stream,
                    Some(peer_addr),
                    options.router.clone(),
                    options.connection,
                    &options.tracker,
                );
                backoff.initial_delay
            }
            Err(e) => {
                let local_addr = listener.local_addr().ok();
                let err = ServerError::Accept(e);
                metrics::inc_errors("accept");
                warn!("{err}: local_addr={local_addr:?}, retry_in={delay:?}");
                sleep(delay).await;
                backoff.next_delay(delay)
            }
        }),
    }
}
