//! # workfunnel
//!
//! A coroutine-powered dispatch-and-synchronization layer: many concurrent
//! HTTP requests funnel their tree-mutating work onto a single serialized
//! work loop that exclusively owns the shared dispatch tree.
//!
//! ## Architecture
//!
//! ```text
//! HTTP connections (many coroutines)
//!         │
//!         ▼
//!   AppService::call ── parse ── route (Controller / MappingSet)
//!         │
//!   ┌─────┴──────────┐
//!   │ Direct handler │ runs inline, no tree access
//!   └─────┬──────────┘
//!         │ Serialized handler
//!         ▼
//!   WorkQueue::queue_and_wait ──► WorkLoop (one coroutine)
//!                                     │ owns &mut DispatchTree
//!                                     ▼
//!                               reply channel ──► response
//! ```
//!
//! - [`router`]: path patterns, verb tables and the hierarchical
//!   [`Controller`](router::Controller) that mounts children by path prefix
//! - [`work`]: the [`WorkLoop`](work::WorkLoop) coroutine and the
//!   [`WorkQueue`](work::WorkQueue) producer handle implementing
//!   queue-and-wait
//! - [`tree`]: the [`DispatchTree`](tree::DispatchTree) shared state,
//!   reachable only from inside the loop
//! - [`server`]: `may_minihttp` integration: parsing, dispatch, rendering
//! - [`handler`]: the request view handlers receive and the
//!   direct/serialized handler split
//! - [`error`]: routing and controller error kinds and their downcastable
//!   carriers
//! - [`metrics`] / [`config`]: injected bookkeeping collaborators

pub mod config;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod router;
pub mod server;
pub mod tree;
pub mod work;

pub use config::{AppConfig, RuntimeConfig};
pub use error::{ControllerError, MalformedBody, RouteError, WaitTimeout};
pub use handler::{HandlerRef, HandlerRequest};
pub use metrics::Counters;
pub use router::Controller;
pub use server::{AppService, HttpServer, ServerHandle};
pub use tree::DispatchTree;
pub use work::{WorkLoop, WorkQueue};
