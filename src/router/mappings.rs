use crate::error::RouteError;
use crate::handler::HandlerRef;
use http::Method;
use tracing::{debug, warn};

use super::pattern::{split_segments, ParamVec, PathPattern};

/// Ordered mapping from HTTP method to a bound handler, fixed at
/// registration time.
///
/// Built fluently:
///
/// ```rust,ignore
/// MethodTable::new()
///     .get(HandlerRef::serialized(get_node))
///     .put(HandlerRef::serialized(update_node))
/// ```
#[derive(Clone, Debug, Default)]
pub struct MethodTable {
    entries: Vec<(Method, HandlerRef)>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler to an arbitrary method. Re-binding a method replaces
    /// the previous handler.
    pub fn insert(mut self, method: Method, handler: HandlerRef) -> Self {
        self.entries.retain(|(m, _)| *m != method);
        self.entries.push((method, handler));
        self
    }

    pub fn get(self, handler: HandlerRef) -> Self {
        self.insert(Method::GET, handler)
    }

    pub fn post(self, handler: HandlerRef) -> Self {
        self.insert(Method::POST, handler)
    }

    pub fn put(self, handler: HandlerRef) -> Self {
        self.insert(Method::PUT, handler)
    }

    pub fn delete(self, handler: HandlerRef) -> Self {
        self.insert(Method::DELETE, handler)
    }

    /// Look up the handler bound to a method.
    pub fn handler_for(&self, method: &Method) -> Option<&HandlerRef> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, h)| h)
    }

    /// Whether any handler is bound to the method.
    pub fn allows(&self, method: &Method) -> bool {
        self.handler_for(method).is_some()
    }
}

/// One registered (pattern, method table) pair.
#[derive(Clone, Debug)]
pub struct MappingEntry {
    pub pattern: PathPattern,
    pub methods: MethodTable,
}

/// Result of successfully resolving a request to a handler.
#[derive(Clone, Debug)]
pub struct RouteMatch {
    /// The bound handler, cloned out of the matched entry
    pub handler: HandlerRef,
    /// Path captures in pattern order
    pub path_params: ParamVec,
    /// The pattern that matched, as registered
    pub pattern: String,
}

/// An ordered collection of mapping entries.
///
/// Entries are kept in insertion order and the first entry whose pattern
/// matches the path *and* whose method table contains the verb wins, so
/// resolution is deterministic for a given registration sequence.
#[derive(Clone, Debug, Default)]
pub struct MappingSet {
    entries: Vec<MappingEntry>,
}

impl MappingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a (pattern, method table) entry. Order is significant.
    pub fn register(&mut self, pattern: &str, methods: MethodTable) {
        self.entries.push(MappingEntry {
            pattern: PathPattern::parse(pattern),
            methods,
        });
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a (method, path) pair to a handler and its captures.
    ///
    /// Scanning continues past entries whose pattern matches but whose
    /// method table lacks the verb, so a later entry may still accept it;
    /// only when the scan ends is the failure classified as
    /// [`RouteError::MethodNotAllowed`] (some pattern matched) or
    /// [`RouteError::NoRouteMatched`] (none did).
    pub fn resolve(&self, method: &Method, path: &str) -> Result<RouteMatch, RouteError> {
        let segments = split_segments(path);
        let mut path_matched = false;

        for entry in &self.entries {
            let Some(path_params) = entry.pattern.matches(&segments) else {
                continue;
            };
            if let Some(handler) = entry.methods.handler_for(method) {
                debug!(
                    method = %method,
                    path = %path,
                    pattern = %entry.pattern.as_str(),
                    captures = path_params.len(),
                    "Route matched"
                );
                return Ok(RouteMatch {
                    handler: handler.clone(),
                    path_params,
                    pattern: entry.pattern.as_str().to_string(),
                });
            }
            path_matched = true;
        }

        if path_matched {
            warn!(method = %method, path = %path, "Method not allowed");
            Err(RouteError::MethodNotAllowed {
                method: method.clone(),
                path: path.to_string(),
            })
        } else {
            warn!(method = %method, path = %path, "No route matched");
            Err(RouteError::NoRouteMatched {
                path: path.to_string(),
            })
        }
    }
}
