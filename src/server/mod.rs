//! HTTP server layer.
//!
//! Built on `may_minihttp` coroutines: every connection is served by a
//! cloned [`AppService`], which parses the request, routes it through the
//! controller hierarchy and either runs the handler inline or funnels it
//! onto the serialized work loop.
//!
//! Submodules:
//! - `request`: request parsing (headers, cookies, query, body decoding)
//! - `response`: response rendering (status lines, JSON errors, callback wrapping)
//! - `service`: the `HttpService` implementation tying routing and work dispatch together
//! - `http_server`: server lifecycle (start, readiness, shutdown)

mod http_server;
mod request;
mod response;
mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{decode_body, parse_request, ParsedRequest};
pub use response::{wrap_callback, write_handler_response, write_json_error};
pub use service::{health_endpoint, stats_endpoint, AppService};
