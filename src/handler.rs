//! Handler references and the request snapshot handed to them.
//!
//! Routing resolves a request to a [`HandlerRef`] at registration time, not
//! by name lookup per request. Whether a handler needs the serialized work
//! loop is declared by its variant:
//!
//! - [`HandlerRef::Direct`] runs in the request coroutine and has no access
//!   to the dispatch tree. Use it for read-only endpoints that do not touch
//!   shared state.
//! - [`HandlerRef::Serialized`] is only ever invoked inside the work loop
//!   coroutine; the `&mut DispatchTree` parameter it receives is the only
//!   mutation handle the API exposes.

use crate::router::ParamVec;
use crate::tree::DispatchTree;
use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Request data handed to a handler.
///
/// A self-contained snapshot: serialized handlers are executed on another
/// coroutine, so the request must carry everything they need.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// HTTP method (GET, POST, ...)
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// Path captures extracted by the matched pattern, in pattern order
    pub path_params: ParamVec,
    /// Parsed query string parameters
    pub query_params: HashMap<String, String>,
    /// HTTP headers (lowercase names)
    pub headers: HashMap<String, String>,
    /// Cookies parsed from the Cookie header
    pub cookies: HashMap<String, String>,
    /// Decoded JSON body, if the request carried one
    pub body: Option<Value>,
}

impl HandlerRequest {
    /// Get a path capture by name.
    ///
    /// Last write wins: with duplicate names at different path depths the
    /// deepest capture is returned.
    #[inline]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name.
    #[inline]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Get a header by name (names are stored lowercase).
    #[inline]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// A handler that runs in the request coroutine.
pub type DirectFn = Arc<dyn Fn(&HandlerRequest) -> anyhow::Result<Value> + Send + Sync>;

/// A handler that runs inside the work loop with exclusive tree access.
pub type SerializedFn =
    Arc<dyn Fn(&HandlerRequest, &mut DispatchTree) -> anyhow::Result<Value> + Send + Sync>;

/// A statically-typed handler reference bound to a route entry.
#[derive(Clone)]
pub enum HandlerRef {
    /// Runs inline; never sees the dispatch tree
    Direct(DirectFn),
    /// Queued onto the work loop; receives `&mut DispatchTree`
    Serialized(SerializedFn),
}

impl HandlerRef {
    /// Wrap a closure as a direct handler.
    pub fn direct<F>(f: F) -> Self
    where
        F: Fn(&HandlerRequest) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        HandlerRef::Direct(Arc::new(f))
    }

    /// Wrap a closure as a serialized handler.
    pub fn serialized<F>(f: F) -> Self
    where
        F: Fn(&HandlerRequest, &mut DispatchTree) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        HandlerRef::Serialized(Arc::new(f))
    }

    /// Whether this handler must run on the work loop.
    pub fn requires_serialization(&self) -> bool {
        matches!(self, HandlerRef::Serialized(_))
    }
}

impl std::fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerRef::Direct(_) => f.write_str("HandlerRef::Direct"),
            HandlerRef::Serialized(_) => f.write_str("HandlerRef::Serialized"),
        }
    }
}
