use super::request::{decode_body, parse_request, ParsedRequest};
use super::response::{write_handler_response, write_json_error};
use crate::config::AppConfig;
use crate::error::{ControllerError, RouteError, WaitTimeout};
use crate::handler::{HandlerRef, HandlerRequest};
use crate::metrics::Counters;
use crate::router::{Controller, RouteMatch};
use crate::work::WorkQueue;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::{json, Value};
use std::io;
use std::sync::Arc;
use tracing::{debug, error};

/// The per-request entry point.
///
/// One cloned instance serves each connection. All fields are shared
/// handles: the root controller is the routing tree, the work queue is the
/// hand-off into the serialized loop, and counters/config are the injected
/// bookkeeping collaborators.
#[derive(Clone)]
pub struct AppService {
    pub root: Arc<Controller>,
    pub queue: WorkQueue,
    pub counters: Arc<Counters>,
    pub config: Arc<AppConfig>,
}

impl AppService {
    pub fn new(
        root: Arc<Controller>,
        queue: WorkQueue,
        counters: Arc<Counters>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            root,
            queue,
            counters,
            config,
        }
    }

    /// Policy-gated request bookkeeping.
    ///
    /// Counts never require serialized access to the dispatch tree, only to
    /// the independent counters store.
    fn record_request(&self, method: &str) {
        if !self.config.get_bool("core", "collect_stats") {
            return;
        }
        self.counters.increment("incoming_requests");
        match method {
            "GET" => self.counters.increment("incoming_get"),
            "POST" => self.counters.increment("incoming_post"),
            "PUT" => self.counters.increment("incoming_put"),
            "DELETE" => self.counters.increment("incoming_delete"),
            _ => self.counters.increment("incoming_other"),
        }
    }

    /// Run a resolved handler to completion.
    ///
    /// Direct handlers execute in the calling coroutine. Serialized
    /// handlers are wrapped as a workload closing over the request and
    /// queued onto the work loop; the call blocks until the loop has run
    /// them.
    fn execute(&self, handler: HandlerRef, request: HandlerRequest) -> anyhow::Result<Value> {
        match handler {
            HandlerRef::Direct(f) => f(&request),
            HandlerRef::Serialized(f) => self.queue.queue_and_wait(move |tree| f(&request, tree)),
        }
    }
}

/// Basic health check endpoint returning `{ "status": "ok" }`.
pub fn health_endpoint(res: &mut Response) -> io::Result<()> {
    write_handler_response(res, 200, json!({ "status": "ok" }), None);
    Ok(())
}

/// Counters snapshot endpoint returning the stats store as JSON.
pub fn stats_endpoint(res: &mut Response, counters: &Counters) -> io::Result<()> {
    write_handler_response(res, 200, counters.snapshot_json(), None);
    Ok(())
}

/// Map a handler failure to a response, preserving the error kind.
///
/// `ControllerError` (any variant) is "not found"; a bounded wait that
/// expired is a gateway timeout; everything else is an internal error. The
/// concrete kind survives the work loop because failures travel as
/// `anyhow::Error` and are downcast here.
fn write_handler_error(res: &mut Response, err: &anyhow::Error) {
    if let Some(ctrl) = err.downcast_ref::<ControllerError>() {
        let kind = match ctrl {
            ControllerError::ResourceNotFound { .. } => "resource_not_found",
            ControllerError::Failed { .. } => "controller_failed",
        };
        write_json_error(res, 404, json!({ "error": kind, "message": ctrl.to_string() }));
    } else if let Some(timeout) = err.downcast_ref::<WaitTimeout>() {
        write_json_error(
            res,
            504,
            json!({ "error": "wait_timeout", "message": timeout.to_string() }),
        );
    } else {
        error!(error = %err, "Handler failed");
        write_json_error(
            res,
            500,
            json!({ "error": "internal_error", "message": err.to_string() }),
        );
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let ParsedRequest {
            method,
            path,
            headers,
            cookies,
            query_params,
            raw_body,
        } = parse_request(req);

        self.record_request(&method);

        if method == "GET" && path == "/health" {
            return health_endpoint(res);
        }
        if method == "GET" && path == "/stats" {
            return stats_endpoint(res, &self.counters);
        }

        let method: Method = match method.parse() {
            Ok(m) => m,
            Err(_) => {
                write_json_error(
                    res,
                    400,
                    json!({ "error": "bad_method", "message": format!("unrecognized method '{method}'") }),
                );
                return Ok(());
            }
        };

        let RouteMatch {
            handler,
            path_params,
            pattern,
        } = match self.root.resolve(&method, &path) {
            Ok(m) => m,
            Err(err @ RouteError::NoRouteMatched { .. }) => {
                write_json_error(
                    res,
                    400,
                    json!({
                        "error": "no_route_matched",
                        "message": err.to_string(),
                        "method": method.as_str(),
                        "path": path,
                    }),
                );
                return Ok(());
            }
            Err(err @ RouteError::MethodNotAllowed { .. }) => {
                write_json_error(
                    res,
                    405,
                    json!({
                        "error": "method_not_allowed",
                        "message": err.to_string(),
                        "method": method.as_str(),
                        "path": path,
                    }),
                );
                return Ok(());
            }
        };

        let body = match decode_body(raw_body.as_deref()) {
            Ok(b) => b,
            Err(malformed) => {
                write_json_error(
                    res,
                    400,
                    json!({ "error": "malformed_body", "message": malformed.to_string() }),
                );
                return Ok(());
            }
        };

        let callback = query_params.get("callback").cloned();
        let request = HandlerRequest {
            method,
            path,
            path_params,
            query_params,
            headers,
            cookies,
            body,
        };

        debug!(
            pattern = %pattern,
            serialized = handler.requires_serialization(),
            "Dispatching request"
        );

        match self.execute(handler, request) {
            Ok(value) => write_handler_response(res, 200, value, callback.as_deref()),
            Err(err) => write_handler_error(res, &err),
        }
        Ok(())
    }
}
