//! Request dispatch keyed by API key.
//!
//! A [`Router`] maps API keys to [`Handler`]s. Each handler receives the
//! decoded [`Request`] and returns a complete, length-prefixed response frame.
//! Requests whose key has no route are answered by the fallback handler,
//! which by default is the `ApiVersions` handler: every request on the wire
//! receives a capability-negotiation response.

use std::{collections::HashMap, fmt, sync::Arc};

use bytes::Bytes;
use thiserror::Error;

use crate::protocol::{API_VERSIONS_KEY, Request, decide_error_code, encode_api_versions_response};

/// Request handler producing an encoded response frame.
pub type Handler = Arc<dyn Fn(&Request) -> Bytes + Send + Sync>;

/// Errors raised while configuring a [`Router`].
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RouterError {
    /// A route with the provided API key was already registered.
    #[error("route for api key {0} was already registered")]
    DuplicateRoute(i16),
}

/// Answer a request with the `ApiVersions` response, using the version
/// policy to pick the error code.
#[must_use]
pub fn api_versions_handler(request: &Request) -> Bytes {
    let header = &request.header;
    let error_code = decide_error_code(header.api_key, header.api_version);
    encode_api_versions_response(header.correlation_id, error_code)
}

/// Dispatch table from API key to handler.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use brokerwire::{
///     dispatch::{Router, RouterError},
///     protocol::Request,
/// };
///
/// let router = Router::new();
/// assert!(router.has_route(18));
/// assert_eq!(
///     router.route(18, Arc::new(|_: &Request| bytes::Bytes::new())).err(),
///     Some(RouterError::DuplicateRoute(18))
/// );
/// ```
#[derive(Clone)]
pub struct Router {
    routes: HashMap<i16, Handler>,
    fallback: Handler,
}

impl Router {
    /// Router whose only route, and fallback, is the `ApiVersions` handler.
    #[must_use]
    pub fn new() -> Self {
        let api_versions: Handler = Arc::new(api_versions_handler);
        let mut routes = HashMap::new();
        routes.insert(API_VERSIONS_KEY, Arc::clone(&api_versions));
        Self {
            routes,
            fallback: api_versions,
        }
    }

    /// Register a route that maps `api_key` to `handler`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DuplicateRoute`] if a handler for `api_key`
    /// has already been registered.
    pub fn route(mut self, api_key: i16, handler: Handler) -> Result<Self, RouterError> {
        if self.routes.contains_key(&api_key) {
            return Err(RouterError::DuplicateRoute(api_key));
        }
        self.routes.insert(api_key, handler);
        Ok(self)
    }

    /// Replace the handler used for API keys without a route.
    #[must_use]
    pub fn fallback(mut self, handler: Handler) -> Self {
        self.fallback = handler;
        self
    }

    /// Whether `api_key` has a dedicated route.
    #[must_use]
    pub fn has_route(&self, api_key: i16) -> bool { self.routes.contains_key(&api_key) }

    /// Produce the response frame for `request`.
    #[must_use]
    pub fn dispatch(&self, request: &Request) -> Bytes {
        let handler = self
            .routes
            .get(&request.header.api_key)
            .unwrap_or(&self.fallback);
        handler(request)
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.routes.keys().copied().collect();
        keys.sort_unstable();
        f.debug_struct("Router").field("routes", &keys).finish_non_exhaustive()
    }
}
