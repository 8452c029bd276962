//! Configuration utilities for [`BrokerServer`].

use tokio::sync::oneshot;

use super::{BrokerServer, ServerState, Unbound};
use crate::{
    codec::clamp_frame_length,
    config::{BackoffConfig, ConnectionOptions, ServerConfig, default_workers},
    dispatch::Router,
    protocol::HeaderStrategy,
};

pub mod binding;


impl BrokerServer<Unbound> {
    /// Create a new `BrokerServer` serving requests through `router`.
    ///
    /// The worker count defaults to the number of available CPU cores (or 1
    /// if this cannot be determined). Call [`bind`](Self::bind) before
    /// running the server.
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self {
            router,
            workers: default_workers(),
            connection: ConnectionOptions::default(),
            backoff_config: BackoffConfig::default(),
            ready_tx: None,
            state: Unbound,
        }
    }

    /// Create a server from a complete [`ServerConfig`].
    ///
    /// `config.bind_addr` is not bound here; pass it to
    /// [`bind`](Self::bind).
    ///
    /// # Examples
    ///
    /// ```
    /// use brokerwire::{config::ServerConfig, dispatch::Router, server::BrokerServer};
    ///
    /// let config = ServerConfig {
    ///     workers: 2,
    ///     ..ServerConfig::default()
    /// };
    /// let server = BrokerServer::from_config(Router::new(), &config);
    /// assert_eq!(server.worker_count(), 2);
    /// ```
    #[must_use]
    pub fn from_config(router: Router, config: &ServerConfig) -> Self {
        Self::new(router)
            .workers(config.workers)
            .max_frame_length(config.connection.max_frame_length)
            .header_strategy(config.connection.header_strategy)
            .accept_backoff(config.backoff)
    }
}

impl<S> BrokerServer<S>
where
    S: ServerState,
{
    /// Set the number of worker tasks to spawn for the server.
    #[must_use]
    pub fn workers(mut self, count: usize) -> Self {
        self.workers = count.max(1);
        self
    }

    /// Set the largest accepted request frame, clamped to the codec's
    /// supported range.
    #[must_use]
    pub fn max_frame_length(mut self, max_frame_length: usize) -> Self {
        self.connection.max_frame_length = clamp_frame_length(max_frame_length);
        self
    }

    /// Choose how request headers are decoded.
    #[must_use]
    pub fn header_strategy(mut self, strategy: HeaderStrategy) -> Self {
        self.connection.header_strategy = strategy;
        self
    }

    /// Configure the back-off applied after failed `accept()` calls.
    #[must_use]
    pub fn accept_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff_config = backoff.normalized();
        self
    }

    /// Register a channel notified once the server is accepting connections.
    ///
    /// The sender is consumed by the next run; a fresh channel is needed for
    /// every start.
    #[must_use]
    pub fn ready_signal(mut self, tx: oneshot::Sender<()>) -> Self {
        self.ready_tx = Some(tx);
        self
    }

    /// Configured worker count.
    #[must_use]
    pub fn worker_count(&self) -> usize { self.workers }

    /// Options applied to every accepted connection.
    #[must_use]
    pub fn connection_options(&self) -> ConnectionOptions { self.connection }

    /// Configured accept back-off.
    #[must_use]
    pub fn backoff_config(&self) -> BackoffConfig { self.backoff_config }

    /// Router shared by all connections.
    #[must_use]
    pub fn router(&self) -> &Router { &self.router }
}
