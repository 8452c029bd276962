//! Tokio-based TCP server for the broker protocol.
//!
//! [`BrokerServer`] spawns worker tasks that accept TCP connections and serve
//! each one with the connection loop in [`crate::connection`]. Every
//! connection shares one [`Router`] and one set of [`ConnectionOptions`].

use std::sync::Arc;

use tokio::{net::TcpListener, sync::oneshot};

use crate::{
    config::{BackoffConfig, ConnectionOptions},
    dispatch::Router,
};

/// Tokio-based server answering broker protocol requests.
///
/// The server carries a typestate `S` indicating whether it is [`Unbound`]
/// (not yet bound to a TCP listener) or [`Bound`]. New servers start
/// `Unbound` and must call [`BrokerServer::bind`] or
/// [`BrokerServer::bind_existing_listener`] before running. Each worker task
/// runs its own accept loop on the shared listener.
#[derive(Debug)]
pub struct BrokerServer<S = Unbound>
where
    S: ServerState,
{
    pub(crate) router: Router,
    pub(crate) workers: usize,
    pub(crate) connection: ConnectionOptions,
    pub(crate) backoff_config: BackoffConfig,
    /// Single-use readiness notification, sent once all workers are spawned.
    pub(crate) ready_tx: Option<oneshot::Sender<()>>,
    pub(crate) state: S,
}

/// Marker indicating the server has not yet bound a listener.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbound;

/// Marker indicating the server is bound to a TCP listener.
#[derive(Debug, Clone)]
pub struct Bound {
    pub(crate) listener: Arc<TcpListener>,
}

/// Trait implemented by [`Unbound`] and [`Bound`] to model binding typestate.
pub trait ServerState: sealed::Sealed {}

mod sealed {
    //! Prevent external implementations of [`ServerState`].

    pub trait Sealed {}
    impl Sealed for super::Unbound {}
    impl Sealed for super::Bound {}
}

impl ServerState for Unbound {}
impl ServerState for Bound {}

mod config;
pub use config::binding;
mod connection;
pub mod error;
mod runtime;

pub use error::ServerError;

#[cfg(test)]
pub(crate) mod test_util;
