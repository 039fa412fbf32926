use crate::error::RouteError;
use http::Method;
use std::sync::Arc;
use tracing::debug;

use super::mappings::{MappingSet, MethodTable, RouteMatch};
use super::pattern::split_segments;

/// A named, composable routing unit.
///
/// A controller owns exactly one [`MappingSet`] and may have child
/// controllers mounted under literal path segments. Children are shared
/// immutably (`Arc`): a controller never mutates another controller's
/// mappings.
///
/// Resolution order: the controller's own mappings are consulted first, in
/// registration order; if none match the path, the first path segment is
/// compared against the mount table and resolution is delegated to the
/// mounted child with the remaining path. A child's routing failure
/// propagates unchanged (with the full request path restored in the error).
#[derive(Clone, Debug, Default)]
pub struct Controller {
    name: String,
    mappings: MappingSet,
    mounts: Vec<(String, Arc<Controller>)>,
}

impl Controller {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mappings: MappingSet::new(),
            mounts: Vec::new(),
        }
    }

    /// Stable controller name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a (pattern, method table) entry to the owned mapping set.
    pub fn register(&mut self, pattern: &str, methods: MethodTable) {
        self.mappings.register(pattern, methods);
    }

    /// Mount a child controller under a literal first segment.
    ///
    /// A request for `/{segment}/rest...` is delegated to the child as
    /// `/rest...`. Mount segments are matched after the controller's own
    /// mappings.
    pub fn mount(&mut self, segment: impl Into<String>, child: Arc<Controller>) {
        self.mounts.push((segment.into(), child));
    }

    /// Resolve a (method, path) pair against this controller's mappings and
    /// mounted children.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<RouteMatch, RouteError> {
        let own = self.mappings.resolve(method, path);
        match own {
            Ok(m) => return Ok(m),
            // Wrong verb on a matching pattern is authoritative; a mount
            // cannot "fix" the verb for a path this controller owns.
            Err(RouteError::MethodNotAllowed { .. }) => return own,
            Err(RouteError::NoRouteMatched { .. }) => {}
        }

        let segments = split_segments(path);
        if let Some((head, rest)) = segments.split_first() {
            for (mount, child) in &self.mounts {
                if mount == head {
                    debug!(
                        controller = %self.name,
                        mount = %mount,
                        child = %child.name,
                        "Delegating to mounted controller"
                    );
                    let sub_path = format!("/{}", rest.join("/"));
                    return child.resolve(method, &sub_path).map_err(|err| match err {
                        RouteError::NoRouteMatched { .. } => RouteError::NoRouteMatched {
                            path: path.to_string(),
                        },
                        RouteError::MethodNotAllowed { method, .. } => {
                            RouteError::MethodNotAllowed {
                                method,
                                path: path.to_string(),
                            }
                        }
                    });
                }
            }
        }

        own
    }
}
