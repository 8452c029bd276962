//! Server and connection configuration.
//!
//! [`ServerConfig`] gathers every tunable the server exposes. Its defaults
//! reproduce the classic broker endpoint: listen on `0.0.0.0:9092`, accept
//! frames up to 10 MiB, and decode headers legacy-first.

use std::{
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

use crate::{
    codec::{DEFAULT_MAX_FRAME_LENGTH, clamp_frame_length},
    protocol::HeaderStrategy,
};

/// Port conventionally used by the broker protocol.
pub const DEFAULT_PORT: u16 = 9092;

/// Per-connection settings shared by every connection a server accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Largest inbound frame payload accepted, in bytes.
    pub max_frame_length: usize,
    /// How request headers are decoded.
    pub header_strategy: HeaderStrategy,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
            header_strategy: HeaderStrategy::default(),
        }
    }
}

impl ConnectionOptions {
    /// Set the frame ceiling, clamped to the codec's supported range.
    #[must_use]
    pub fn with_max_frame_length(mut self, max_frame_length: usize) -> Self {
        self.max_frame_length = clamp_frame_length(max_frame_length);
        self
    }

    /// Set the header decoding strategy.
    #[must_use]
    pub fn with_header_strategy(mut self, header_strategy: HeaderStrategy) -> Self {
        self.header_strategy = header_strategy;
        self
    }
}

/// Exponential back-off applied when `accept()` fails.
///
/// The delay starts at `initial_delay`, doubles after each consecutive
/// failure and is capped at `max_delay`. A successful accept resets it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for the delay.
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
        }
    }
}

impl BackoffConfig {
    /// Raise both delays to at least 1 ms and order them.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use brokerwire::config::BackoffConfig;
    ///
    /// let cfg = BackoffConfig {
    ///     initial_delay: Duration::from_millis(50),
    ///     max_delay: Duration::ZERO,
    /// }
    /// .normalized();
    /// assert_eq!(cfg.initial_delay, Duration::from_millis(1));
    /// assert_eq!(cfg.max_delay, Duration::from_millis(50));
    /// ```
    #[must_use]
    pub fn normalized(self) -> Self {
        let floor = Duration::from_millis(1);
        let a = self.initial_delay.max(floor);
        let b = self.max_delay.max(floor);
        Self {
            initial_delay: a.min(b),
            max_delay: a.max(b),
        }
    }

    /// Delay to use after a failure that followed a wait of `current`.
    #[must_use]
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_delay)
    }
}

/// Complete server configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub bind_addr: SocketAddr,
    /// Number of accept tasks sharing the listener.
    pub workers: usize,
    /// Settings applied to each accepted connection.
    pub connection: ConnectionOptions,
    /// Accept-failure back-off.
    pub backoff: BackoffConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            workers: default_workers(),
            connection: ConnectionOptions::default(),
            backoff: BackoffConfig::default(),
        }
    }
}

/// Worker count used when none is configured: the available parallelism,
/// or 1 if it cannot be determined.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}
