use may_minihttp::Response;
use serde_json::Value;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "OK",
    }
}

/// Wrap a rendered chunk in `name(chunk);` when the caller supplied a
/// wrapper name, for script-embeddable output. Without a wrapper the chunk
/// passes through unchanged.
pub fn wrap_callback(chunk: String, callback: Option<&str>) -> String {
    match callback {
        Some(name) => format!("{name}({chunk});"),
        None => chunk,
    }
}

/// Write a successful handler result.
///
/// String values render as `text/plain`, everything else as JSON. When a
/// callback wrapper is present the rendered chunk is wrapped and served as
/// `application/javascript`.
pub fn write_handler_response(res: &mut Response, status: u16, body: Value, callback: Option<&str>) {
    let reason = status_reason(status);
    res.status_code(status as usize, reason);

    let (chunk, content_type) = match body {
        Value::String(s) => (s, "text/plain"),
        other => (other.to_string(), "application/json"),
    };

    if callback.is_some() {
        res.header("Content-Type: application/javascript");
    } else {
        match content_type {
            "text/plain" => res.header("Content-Type: text/plain"),
            _ => res.header("Content-Type: application/json"),
        };
    }
    res.body_vec(wrap_callback(chunk, callback).into_bytes());
}

/// Write a JSON error body with the given status.
pub fn write_json_error(res: &mut Response, status: u16, body: Value) {
    let reason = status_reason(status);
    res.status_code(status as usize, reason);
    res.header("Content-Type: application/json");
    res.body_vec(body.to_string().into_bytes());
}
