//! Listener binding for [`BrokerServer`].

use std::{
    net::{SocketAddr, TcpListener as StdTcpListener},
    sync::Arc,
};

use log::info;
use tokio::net::TcpListener;

use crate::server::{Bound, BrokerServer, ServerError, ServerState, Unbound};

impl<S> BrokerServer<S>
where
    S: ServerState,
{
    fn bind_to_listener(self, std_listener: StdTcpListener) -> Result<BrokerServer<Bound>, ServerError> {
        let BrokerServer {
            router,
            workers,
            connection,
            backoff_config,
            ready_tx,
            ..
        } = self;

        std_listener
            .set_nonblocking(true)
            .map_err(ServerError::Bind)?;
        let tokio_listener = TcpListener::from_std(std_listener).map_err(ServerError::Bind)?;
        info!(
            "listener bound: local_addr={:?}",
            tokio_listener.local_addr().ok()
        );

        Ok(BrokerServer {
            router,
            workers,
            connection,
            backoff_config,
            ready_tx,
            state: Bound {
                listener: Arc::new(tokio_listener),
            },
        })
    }

    /// Bind to a fresh address, replacing any existing listener.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::net::{Ipv4Addr, SocketAddr};
    ///
    /// use brokerwire::{dispatch::Router, server::BrokerServer};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let server = BrokerServer::new(Router::new())
    ///     .bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
    ///     .expect("bind failed");
    /// assert!(server.local_addr().is_some());
    /// # }
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime with I/O enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if binding or configuring the listener
    /// fails.
    pub fn bind(self, addr: SocketAddr) -> Result<BrokerServer<Bound>, ServerError> {
        let std_listener = StdTcpListener::bind(addr).map_err(ServerError::Bind)?;
        self.bind_to_listener(std_listener)
    }

    /// Bind to an existing `StdTcpListener`, replacing any existing listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the listener cannot be switched to
    /// non-blocking mode or registered with the runtime.
    pub fn bind_existing_listener(
        self,
        std_listener: StdTcpListener,
    ) -> Result<BrokerServer<Bound>, ServerError> {
        self.bind_to_listener(std_listener)
    }
}

impl BrokerServer<Unbound> {
    /// Return `None` as the server is not bound.
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> { None }
}

impl BrokerServer<Bound> {
    /// Returns the bound address, or `None` if retrieving it fails.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> { self.state.listener.local_addr().ok() }
}
