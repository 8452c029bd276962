//! `brokerwire` server binary.
//!
//! Parses CLI arguments, installs a tracing subscriber and optional
//! Prometheus exporter, and serves broker protocol requests until Ctrl+C.

mod cli;

use brokerwire::{
    config::{ConnectionOptions, ServerConfig, default_workers},
    dispatch::Router,
    protocol::HeaderStrategy,
    server::BrokerServer,
};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt::MakeWriter};

impl From<cli::HeaderStrategyArg> for HeaderStrategy {
    fn from(arg: cli::HeaderStrategyArg) -> Self {
        match arg {
            cli::HeaderStrategyArg::Fallback => Self::Fallback,
            cli::HeaderStrategyArg::VersionAware => Self::VersionAware,
        }
    }
}

fn server_config(cli: &cli::Cli) -> ServerConfig {
    ServerConfig {
        bind_addr: cli.bind,
        workers: cli.workers.unwrap_or_else(default_workers).max(1),
        connection: ConnectionOptions::default()
            .with_max_frame_length(cli.max_frame_length)
            .with_header_strategy(cli.header_strategy.into()),
        ..ServerConfig::default()
    }
}

/// Install the global `fmt` subscriber, filtered by `RUST_LOG` (default
/// `info`). Records from the `log` facade are forwarded to it.
fn install_subscriber<W>(writer: W) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(writer)
        .try_init()
}

#[cfg(feature = "metrics")]
fn install_metrics_exporter(
    addr: Option<std::net::SocketAddr>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(addr) = addr {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        tracing::info!(%addr, "prometheus exporter listening");
    }
    Ok(())
}

#[cfg(not(feature = "metrics"))]
fn install_metrics_exporter(
    addr: Option<std::net::SocketAddr>,
) -> Result<(), Box<dyn std::error::Error>> {
    if addr.is_some() {
        tracing::warn!("--metrics-addr ignored: built without the `metrics` feature");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Applications embedding the library should install their own subscriber.
    install_subscriber(std::io::stderr).map_err(|e| e as Box<dyn std::error::Error>)?;

    let cli = cli::Cli::parse();
    install_metrics_exporter(cli.metrics_addr)?;

    let config = server_config(&cli);
    let server = BrokerServer::from_config(Router::new(), &config).bind(config.bind_addr)?;
    server.run().await?;
    Ok(())
}
