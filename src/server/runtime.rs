//! Runtime control for [`BrokerServer`].

mod accept;

use std::sync::Arc;

#[cfg(test)]
pub(super) use accept::MockAcceptListener;
pub(super) use accept::{AcceptLoopOptions, accept_loop};
use futures::Future;
use log::{info, warn};
use tokio::{select, signal};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use super::{Bound, BrokerServer, ServerError};

impl BrokerServer<Bound> {
    /// Run the server until Ctrl+C is received.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use brokerwire::{dispatch::Router, server::BrokerServer};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), brokerwire::server::ServerError> {
    /// let server = BrokerServer::new(Router::new()).bind(([127, 0, 0, 1], 9092).into())?;
    /// server.run().await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// Attempting to run a server without binding fails to compile:
    ///
    /// ```compile_fail
    /// use brokerwire::{dispatch::Router, server::BrokerServer};
    ///
    /// async fn try_run() {
    ///     BrokerServer::new(Router::new())
    ///         .run()
    ///         .await
    ///         .expect("unbound servers do not expose run()");
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// Accept failures are retried with exponential back-off and do not
    /// surface as errors; the `Result` is reserved for fatal listener
    /// failures.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(async {
            let _ = signal::ctrl_c().await;
        })
        .await
    }

    /// Run the server until the `shutdown` future resolves.
    ///
    /// On shutdown the accept loops stop immediately and in-flight
    /// connections are awaited before this future completes.
    ///
    /// # Examples
    ///
    /// ```
    /// use brokerwire::{dispatch::Router, server::BrokerServer};
    /// use tokio::sync::oneshot;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), brokerwire::server::ServerError> {
    /// let server = BrokerServer::new(Router::new()).bind(([127, 0, 0, 1], 0).into())?;
    ///
    /// let (tx, rx) = oneshot::channel::<()>();
    /// let handle = tokio::spawn(async move {
    ///     server
    ///         .run_with_shutdown(async {
    ///             let _ = rx.await;
    ///         })
    ///         .await
    /// });
    ///
    /// let _ = tx.send(());
    /// handle
    ///     .await
    ///     .expect("join server task")
    ///     .expect("server run failed");
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "tokio::select! expands to modulus internally"
    )]
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        let BrokerServer {
            router,
            workers,
            connection,
            backoff_config,
            ready_tx,
            state: Bound { listener },
        } = self;
        let shutdown_token = CancellationToken::new();
        let tracker = TaskTracker::new();

        info!(
            "server starting: local_addr={:?}, workers={workers}, max_frame_length={}, \
             header_strategy={:?}",
            listener.local_addr().ok(),
            connection.max_frame_length,
            connection.header_strategy
        );

        for _ in 0..workers {
            tracker.spawn(accept_loop(
                Arc::clone(&listener),
                AcceptLoopOptions {
                    router: router.clone(),
                    connection,
                    shutdown: shutdown_token.clone(),
                    tracker: tracker.clone(),
                    backoff: backoff_config,
                },
            ));
        }

        // Signal readiness after all workers have been spawned.
        if let Some(tx) = ready_tx
            && tx.send(()).is_err()
        {
            warn!("Failed to send readiness signal: receiver dropped");
        }

        select! {
            () = shutdown => shutdown_token.cancel(),
            () = tracker.wait() => {},
        }

        tracker.close();
        tracker.wait().await;
        info!("server stopped");
        Ok(())
    }
}
