use http::Method;
use std::fmt;
use std::time::Duration;

/// Routing failure returned by [`MappingSet::resolve`](crate::router::MappingSet::resolve).
///
/// The two kinds are deliberately distinct so a caller can tell "wrong verb"
/// from "wrong path" and map them to different responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No registered pattern matched the request path.
    NoRouteMatched {
        /// The request path that failed to match
        path: String,
    },
    /// At least one pattern matched the path, but no matching entry's method
    /// table contains the requested verb.
    MethodNotAllowed {
        /// The rejected HTTP method
        method: Method,
        /// The request path that matched a pattern
        path: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::NoRouteMatched { path } => {
                write!(f, "no route matched path '{path}'")
            }
            RouteError::MethodNotAllowed { method, path } => {
                write!(f, "method {method} not allowed for path '{path}'")
            }
        }
    }
}

impl std::error::Error for RouteError {}

/// Application-level failure reported by controller handlers.
///
/// Distinct from [`RouteError`]: routing decided the handler, the handler
/// decided the resource is absent (or otherwise unusable). At the response
/// boundary every `ControllerError` maps to a "not found" response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// A handler addressed a resource that does not exist.
    ResourceNotFound {
        /// Description of the missing resource, e.g. `"node 42"`
        resource: String,
    },
    /// Any other application-level controller failure.
    Failed {
        /// Human-readable description of the failure
        message: String,
    },
}

impl ControllerError {
    /// Shorthand for the common "missing resource" case.
    pub fn not_found(resource: impl Into<String>) -> Self {
        ControllerError::ResourceNotFound {
            resource: resource.into(),
        }
    }
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::ResourceNotFound { resource } => {
                write!(f, "resource not found: {resource}")
            }
            ControllerError::Failed { message } => {
                write!(f, "controller failed: {message}")
            }
        }
    }
}

impl std::error::Error for ControllerError {}

/// The request body could not be decoded as structured data.
///
/// Raw decoder errors are translated into this kind at the entry point so
/// callers never see a `serde_json` error directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedBody {
    /// Decoder detail, suitable for the error response message
    pub detail: String,
}

impl fmt::Display for MalformedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the request body is not a valid JSON value: {}", self.detail)
    }
}

impl std::error::Error for MalformedBody {}

/// A bounded queue-and-wait gave up waiting for its workload to complete.
///
/// The workload itself still runs to completion on the work loop; only the
/// caller's wait is bounded. See
/// [`WorkQueue::queue_and_wait_timeout`](crate::work::WorkQueue::queue_and_wait_timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTimeout {
    /// How long the caller waited before giving up
    pub waited: Duration,
}

impl fmt::Display for WaitTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "work item did not complete within {:?}; it will still run",
            self.waited
        )
    }
}

impl std::error::Error for WaitTimeout {}
