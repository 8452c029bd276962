#![doc(html_root_url = "https://docs.rs/brokerwire/latest")]
//! Public API for the `brokerwire` library.
//!
//! This crate implements the server side of a minimal broker wire protocol:
//! length-prefixed framing, request header decoding with legacy and flexible
//! client-id encodings, and the `ApiVersions` capability response. A
//! [`server::BrokerServer`] accepts TCP connections and serves each one with
//! a strictly sequential request/response loop.

pub mod byte_order;
pub mod codec;
pub mod config;
pub mod connection;
pub mod cursor;
pub mod dispatch;
pub mod metrics;
pub mod protocol;
pub mod server;
pub mod transport;

pub use codec::{CodecError, EofError, FramingError, RequestFrameCodec};
pub use config::{BackoffConfig, ConnectionOptions, ServerConfig};
pub use connection::{ConnectionError, serve_connection};
pub use cursor::{ByteCursor, DecodeError};
pub use dispatch::{Handler, Router, RouterError};
pub use metrics::{CONNECTIONS_ACTIVE, Direction, ERRORS_TOTAL, FRAMES_PROCESSED};
pub use protocol::{ErrorCode, HeaderStrategy, Request, RequestHeader};
pub use server::{BrokerServer, ServerError};
pub use transport::{FrameTransport, TransportError};
