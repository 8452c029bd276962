//! Command line interface for the `brokerwire` server binary.
//!
//! Kept free of crate-internal imports so the build script can include it to
//! render the man page.

use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

/// How request headers are decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum HeaderStrategyArg {
    /// Try the legacy header first, then the flexible one.
    #[default]
    Fallback,
    /// Choose the header shape from the request's API version.
    VersionAware,
}

/// Command line arguments for the `brokerwire` binary.
#[derive(Debug, Parser)]
#[command(
    name = "brokerwire",
    version,
    about = "Minimal broker protocol server answering ApiVersions requests"
)]
pub struct Cli {
    /// Address to listen on.
    #[arg(short, long, default_value = "0.0.0.0:9092")]
    pub bind: SocketAddr,

    /// Largest accepted request frame in bytes.
    #[arg(long, default_value_t = 10 * 1024 * 1024)]
    pub max_frame_length: usize,

    /// Number of accept workers; defaults to the available parallelism.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Request header decoding strategy.
    #[arg(long, value_enum, default_value_t = HeaderStrategyArg::Fallback)]
    pub header_strategy: HeaderStrategyArg,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,
}
