//! # Router Module
//!
//! Path matching and route resolution.
//!
//! ## Overview
//!
//! Routing is registration-driven: callers build [`MethodTable`]s of
//! statically-typed [`HandlerRef`](crate::handler::HandlerRef)s and register
//! them against path patterns on a [`Controller`]. Resolution walks the
//! ordered [`MappingSet`] entries and returns the first entry whose pattern
//! matches the path and whose method table contains the verb, together with
//! the captures extracted from the URL.
//!
//! Patterns are plain segment sequences (`/users/{id}`, `/files/{path..}`);
//! matching is a literal-or-capture comparison per segment with no regex
//! semantics.
//!
//! ## Failure kinds
//!
//! Resolution distinguishes "wrong path"
//! ([`RouteError::NoRouteMatched`](crate::error::RouteError)) from "wrong
//! verb" ([`RouteError::MethodNotAllowed`](crate::error::RouteError)); the
//! entry point maps them to different responses.
//!
//! ## Composition
//!
//! Controllers compose hierarchically: a child controller is mounted under a
//! literal first segment of its parent and receives the remaining path. See
//! [`Controller::mount`].

mod controller;
mod mappings;
mod pattern;

pub use controller::Controller;
pub use mappings::{MappingEntry, MappingSet, MethodTable, RouteMatch};
pub use pattern::{split_segments, ParamVec, PathPattern, Segment, MAX_INLINE_PARAMS};
