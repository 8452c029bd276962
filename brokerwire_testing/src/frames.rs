//! Byte-level builders for request frames.

use brokerwire::{
    byte_order::{write_network_i16, write_network_i32},
    protocol::{API_VERSIONS_KEY, HeaderEncoding, put_unsigned_varint},
};

/// Builder for one length-prefixed request frame.
///
/// Headers default to the legacy encoding with a null client id. Calling
/// [`flexible`](Self::flexible) or adding a tagged field switches to the
/// compact encoding.
///
/// ```rust
/// use brokerwire_testing::RequestFrame;
///
/// let frame = RequestFrame::api_versions(4, 7).client_id("test").encode();
/// assert_eq!(
///     frame,
///     [0, 0, 0, 14, 0, 18, 0, 4, 0, 0, 0, 7, 0, 4, b't', b'e', b's', b't']
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestFrame {
    api_key: i16,
    api_version: i16,
    correlation_id: i32,
    client_id: Option<Vec<u8>>,
    encoding: HeaderEncoding,
    tagged_fields: Vec<(u64, Vec<u8>)>,
    body: Vec<u8>,
}

impl RequestFrame {
    /// Request for `api_key` at `api_version` with a null client id.
    #[must_use]
    pub fn new(api_key: i16, api_version: i16, correlation_id: i32) -> Self {
        Self {
            api_key,
            api_version,
            correlation_id,
            client_id: None,
            encoding: HeaderEncoding::Legacy,
            tagged_fields: Vec::new(),
            body: Vec::new(),
        }
    }

    /// `ApiVersions` request at `api_version`.
    #[must_use]
    pub fn api_versions(api_version: i16, correlation_id: i32) -> Self {
        Self::new(API_VERSIONS_KEY, api_version, correlation_id)
    }

    /// Set a UTF-8 client id.
    #[must_use]
    pub fn client_id(self, client_id: impl Into<String>) -> Self {
        self.raw_client_id(client_id.into().into_bytes())
    }

    /// Set client id bytes verbatim, which need not be valid UTF-8.
    #[must_use]
    pub fn raw_client_id(mut self, client_id: impl Into<Vec<u8>>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Encode the header in the flexible (compact) shape.
    #[must_use]
    pub fn flexible(mut self) -> Self {
        self.encoding = HeaderEncoding::Flexible;
        self
    }

    /// Append a tagged field; implies [`flexible`](Self::flexible).
    #[must_use]
    pub fn tagged_field(mut self, tag: u64, data: impl Into<Vec<u8>>) -> Self {
        self.tagged_fields.push((tag, data.into()));
        self.flexible()
    }

    /// Append bytes after the header.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Encode the payload without its length prefix.
    #[must_use]
    pub fn encode_payload(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&write_network_i16(self.api_key));
        out.extend_from_slice(&write_network_i16(self.api_version));
        out.extend_from_slice(&write_network_i32(self.correlation_id));
        match self.encoding {
            HeaderEncoding::Legacy => match &self.client_id {
                Some(id) => {
                    let len = i16::try_from(id.len()).expect("client id fits in i16");
                    out.extend_from_slice(&write_network_i16(len));
                    out.extend_from_slice(id);
                }
                None => out.extend_from_slice(&write_network_i16(-1)),
            },
            HeaderEncoding::Flexible => {
                match &self.client_id {
                    Some(id) => {
                        put_unsigned_varint(&mut out, id.len() as u64 + 1);
                        out.extend_from_slice(id);
                    }
                    None => put_unsigned_varint(&mut out, 0),
                }
                put_unsigned_varint(&mut out, self.tagged_fields.len() as u64);
                for (tag, data) in &self.tagged_fields {
                    put_unsigned_varint(&mut out, *tag);
                    put_unsigned_varint(&mut out, data.len() as u64);
                    out.extend_from_slice(data);
                }
            }
        }
        out.extend_from_slice(&self.body);
        out
    }

    /// Encode the complete frame, length prefix included.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let payload = self.encode_payload();
        let len = i32::try_from(payload.len()).expect("payload fits in i32");
        let mut frame = write_network_i32(len).to_vec();
        frame.extend_from_slice(&payload);
        frame
    }
}

/// Encode a bare length prefix, for frames whose payload is supplied
/// separately or never sent.
#[must_use]
pub fn length_prefix(length: i32) -> [u8; 4] { write_network_i32(length) }
