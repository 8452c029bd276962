//! Utilities for exercising `brokerwire` connections in tests.
//!
//! Build request frames byte-by-byte with [`RequestFrame`], serve them over an
//! in-memory `tokio::io::duplex` stream with [`drive_connection`], and parse
//! the response bytes with [`parse_api_versions_frames`].
//!
//! ```rust
//! use brokerwire::{config::ConnectionOptions, dispatch::Router};
//! use brokerwire_testing::{RequestFrame, drive_connection, parse_api_versions_frames};
//!
//! # async fn example() -> std::io::Result<()> {
//! let request = RequestFrame::api_versions(4, 7).client_id("test").encode();
//! let run = drive_connection(Router::new(), ConnectionOptions::default(), vec![request]).await?;
//! let responses = parse_api_versions_frames(&run.output).unwrap();
//! assert_eq!(responses[0].correlation_id, 7);
//! # Ok(())
//! # }
//! ```

pub mod drive;
pub mod frames;
pub mod logging;
pub mod response;

pub use drive::{ConnectionRun, DEFAULT_CAPACITY, drive_connection, drive_connection_with_capacity};
pub use frames::RequestFrame;
pub use logging::{LoggerHandle, logger};
pub use response::{ApiVersionsFrame, parse_api_versions_frames};
