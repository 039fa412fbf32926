use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum number of path captures before heap allocation.
/// Most routes have well under 8 parameters.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated capture storage for the routing hot path.
///
/// Capture names use `Arc<str>` because they come from the static pattern
/// (known at registration time) and `Arc::clone()` is O(1); values remain
/// `String` as they are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// One segment of a registered path pattern.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Must equal the request segment exactly
    Literal(String),
    /// Captures exactly one non-empty request segment
    Param(Arc<str>),
    /// Captures the remaining request segments joined with `/`.
    /// Only honored as the final segment of a pattern.
    Rest(Arc<str>),
}

/// A registered path pattern: an ordered sequence of literal and capture
/// segments. Immutable once parsed.
///
/// Syntax: `/users/{id}` captures one segment as `id`;
/// `/files/{path..}` captures the rest of the path (possibly empty) as
/// `path`. There are no regex semantics beyond literal-or-capture
/// comparison per segment.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Split a request path into non-empty segments.
pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

impl PathPattern {
    /// Parse a pattern string.
    ///
    /// `{name}` marks a single-segment capture; `{name..}` in the final
    /// position marks a rest capture. Anything else is a literal segment.
    /// A `{name..}` that is not last is treated as a literal, since a rest
    /// capture can only be unambiguous at the tail.
    pub fn parse(pattern: &str) -> Self {
        let parts = split_segments(pattern);
        let last = parts.len().saturating_sub(1);
        let segments = parts
            .iter()
            .enumerate()
            .map(|(i, part)| {
                if let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                    if let Some(name) = inner.strip_suffix("..") {
                        if i == last {
                            return Segment::Rest(Arc::from(name));
                        }
                    } else {
                        return Segment::Param(Arc::from(inner));
                    }
                }
                Segment::Literal((*part).to_string())
            })
            .collect();
        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    /// The pattern as originally written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a pre-split request path against this pattern.
    ///
    /// Returns the captures in pattern order on success, `None` otherwise.
    /// Pure lookup; no side effects.
    pub fn matches(&self, path_segments: &[&str]) -> Option<ParamVec> {
        let mut params = ParamVec::new();
        let mut remaining = path_segments;

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Rest(name) => {
                    // Rest is always last by construction; it may capture
                    // zero segments.
                    debug_assert_eq!(i, self.segments.len() - 1);
                    params.push((Arc::clone(name), remaining.join("/")));
                    return Some(params);
                }
                Segment::Literal(lit) => {
                    let (head, rest) = remaining.split_first()?;
                    if head != lit {
                        return None;
                    }
                    remaining = rest;
                }
                Segment::Param(name) => {
                    let (head, rest) = remaining.split_first()?;
                    params.push((Arc::clone(name), (*head).to_string()));
                    remaining = rest;
                }
            }
        }

        if remaining.is_empty() {
            Some(params)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(pattern: &str, path: &str) -> Option<Vec<(String, String)>> {
        let pat = PathPattern::parse(pattern);
        pat.matches(&split_segments(path))
            .map(|params| params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    #[test]
    fn literal_match() {
        assert_eq!(capture("/users", "/users"), Some(vec![]));
        assert_eq!(capture("/users", "/users/"), Some(vec![]));
        assert_eq!(capture("/users", "/orders"), None);
        assert_eq!(capture("/users", "/users/42"), None);
    }

    #[test]
    fn param_capture() {
        assert_eq!(
            capture("/users/{id}", "/users/42"),
            Some(vec![("id".to_string(), "42".to_string())])
        );
        assert_eq!(capture("/users/{id}", "/users"), None);
        assert_eq!(capture("/users/{id}", "/users/42/posts"), None);
    }

    #[test]
    fn captures_in_pattern_order() {
        assert_eq!(
            capture("/users/{uid}/posts/{pid}", "/users/9/posts/p1"),
            Some(vec![
                ("uid".to_string(), "9".to_string()),
                ("pid".to_string(), "p1".to_string()),
            ])
        );
    }

    #[test]
    fn rest_captures_remaining_segments() {
        assert_eq!(
            capture("/files/{path..}", "/files/a/b/c"),
            Some(vec![("path".to_string(), "a/b/c".to_string())])
        );
        assert_eq!(
            capture("/files/{path..}", "/files"),
            Some(vec![("path".to_string(), String::new())])
        );
    }

    #[test]
    fn rest_not_last_is_literal() {
        assert_eq!(capture("/{x..}/y", "/a/b/y"), None);
        assert_eq!(
            capture("/{x..}/y", "/{x..}/y"),
            Some(vec![])
        );
    }

    #[test]
    fn root_pattern_matches_root() {
        assert_eq!(capture("/", "/"), Some(vec![]));
        assert_eq!(capture("/", "/users"), None);
    }
}
