//! Broker wire protocol: request headers, version policy and the
//! capability-negotiation response.
//!
//! The modules are layered leaves-first: [`api`] and [`error_code`] hold wire
//! constants, [`header`] decodes request headers from a
//! [`ByteCursor`](crate::cursor::ByteCursor), [`version`] decides the error
//! code for a request, and [`api_versions`] encodes the response frame.

pub mod api;
pub mod api_versions;
pub mod error_code;
pub mod header;
pub mod version;

pub use api::{API_VERSIONS_KEY, ApiVersionRange, SUPPORTED_APIS};
pub use api_versions::{ApiVersionsResponse, encode_api_versions_response, put_unsigned_varint};
pub use error_code::ErrorCode;
pub use header::{HeaderEncoding, HeaderError, HeaderStrategy, Request, RequestHeader};
pub use version::decide_error_code;
