//! API identifiers and the version ranges this server advertises.

/// API key of the capability-negotiation (`ApiVersions`) request.
pub const API_VERSIONS_KEY: i16 = 18;

/// Inclusive range of versions supported for one API key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApiVersionRange {
    /// API key the range applies to.
    pub api_key: i16,
    /// Lowest supported version.
    pub min_version: i16,
    /// Highest supported version.
    pub max_version: i16,
}

impl ApiVersionRange {
    /// Whether `version` falls inside this range.
    #[must_use]
    pub const fn contains(&self, version: i16) -> bool {
        version >= self.min_version && version <= self.max_version
    }
}

/// Every API advertised in the `ApiVersions` response, in wire order.
pub const SUPPORTED_APIS: [ApiVersionRange; 1] = [ApiVersionRange {
    api_key: API_VERSIONS_KEY,
    min_version: 0,
    max_version: 4,
}];

/// Look up the advertised range for `api_key`.
#[must_use]
pub fn supported_range(api_key: i16) -> Option<ApiVersionRange> {
    SUPPORTED_APIS
        .iter()
        .copied()
        .find(|range| range.api_key == api_key)
}

/// First request version that uses the flexible (compact, tagged-field)
/// header for `api_key`, where known.
#[must_use]
pub const fn first_flexible_version(api_key: i16) -> Option<i16> {
    match api_key {
        API_VERSIONS_KEY => Some(3),
        _ => None,
    }
}
