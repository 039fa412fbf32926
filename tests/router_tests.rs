use http::Method;
use serde_json::json;
use std::sync::Arc;
use workfunnel::router::{Controller, MethodTable};
use workfunnel::{HandlerRef, RouteError};

fn ok_handler(tag: &'static str) -> HandlerRef {
    HandlerRef::direct(move |_req| Ok(json!({ "handler": tag })))
}

fn users_controller() -> Controller {
    let mut users = Controller::new("users");
    users.register("/", MethodTable::new().get(ok_handler("list_users")));
    users.register(
        "/{id}",
        MethodTable::new()
            .get(ok_handler("get_user"))
            .delete(ok_handler("delete_user")),
    );
    users
}

#[test]
fn test_match_with_path_capture() {
    let mut root = Controller::new("root");
    root.register("/users/{id}", MethodTable::new().get(ok_handler("get_user")));

    let m = root.resolve(&Method::GET, "/users/42").unwrap();
    assert_eq!(m.pattern, "/users/{id}");
    assert_eq!(m.path_params.len(), 1);
    assert_eq!(m.path_params[0].0.as_ref(), "id");
    assert_eq!(m.path_params[0].1, "42");
}

#[test]
fn test_wrong_verb_is_method_not_allowed() {
    let mut root = Controller::new("root");
    root.register("/users/{id}", MethodTable::new().get(ok_handler("get_user")));

    let err = root.resolve(&Method::POST, "/users/42").unwrap_err();
    assert_eq!(
        err,
        RouteError::MethodNotAllowed {
            method: Method::POST,
            path: "/users/42".to_string(),
        }
    );
}

#[test]
fn test_unknown_path_is_no_route_matched() {
    let mut root = Controller::new("root");
    root.register("/users/{id}", MethodTable::new().get(ok_handler("get_user")));

    let err = root.resolve(&Method::GET, "/orders/42").unwrap_err();
    assert_eq!(
        err,
        RouteError::NoRouteMatched {
            path: "/orders/42".to_string(),
        }
    );
}

#[test]
fn test_registration_order_decides_overlaps() {
    // With a literal before the capture, "/users/me" hits the literal.
    let mut first = Controller::new("root");
    first.register("/users/me", MethodTable::new().get(ok_handler("me")));
    first.register("/users/{id}", MethodTable::new().get(ok_handler("by_id")));
    let m = first.resolve(&Method::GET, "/users/me").unwrap();
    assert_eq!(m.pattern, "/users/me");

    // Flip the order and the capture wins instead.
    let mut second = Controller::new("root");
    second.register("/users/{id}", MethodTable::new().get(ok_handler("by_id")));
    second.register("/users/me", MethodTable::new().get(ok_handler("me")));
    let m = second.resolve(&Method::GET, "/users/me").unwrap();
    assert_eq!(m.pattern, "/users/{id}");
    assert_eq!(m.path_params[0].1, "me");
}

#[test]
fn test_scan_continues_past_verb_mismatch() {
    // The first entry matches the path but not the verb; a later entry may
    // still accept the request.
    let mut root = Controller::new("root");
    root.register("/items/{id}", MethodTable::new().get(ok_handler("get_item")));
    root.register(
        "/items/{id}",
        MethodTable::new().post(ok_handler("post_item")),
    );

    let m = root.resolve(&Method::POST, "/items/7").unwrap();
    assert_eq!(m.pattern, "/items/{id}");
}

#[test]
fn test_rest_segment_captures_remainder() {
    let mut root = Controller::new("root");
    root.register(
        "/files/{path..}",
        MethodTable::new().get(ok_handler("get_file")),
    );

    let m = root.resolve(&Method::GET, "/files/a/b/c.txt").unwrap();
    assert_eq!(m.path_params[0].0.as_ref(), "path");
    assert_eq!(m.path_params[0].1, "a/b/c.txt");

    let m = root.resolve(&Method::GET, "/files").unwrap();
    assert_eq!(m.path_params[0].1, "");
}

#[test]
fn test_mounted_controller_resolves_sub_path() {
    let mut root = Controller::new("root");
    root.register("/", MethodTable::new().get(ok_handler("status")));
    root.mount("users", Arc::new(users_controller()));

    let m = root.resolve(&Method::GET, "/users/42").unwrap();
    assert_eq!(m.pattern, "/{id}");
    assert_eq!(m.path_params[0].1, "42");

    let m = root.resolve(&Method::GET, "/users").unwrap();
    assert_eq!(m.pattern, "/");
}

#[test]
fn test_child_errors_carry_full_path() {
    let mut root = Controller::new("root");
    root.mount("users", Arc::new(users_controller()));

    let err = root.resolve(&Method::GET, "/users/42/posts").unwrap_err();
    assert_eq!(
        err,
        RouteError::NoRouteMatched {
            path: "/users/42/posts".to_string(),
        }
    );

    let err = root.resolve(&Method::POST, "/users/42").unwrap_err();
    assert_eq!(
        err,
        RouteError::MethodNotAllowed {
            method: Method::POST,
            path: "/users/42".to_string(),
        }
    );
}

#[test]
fn test_own_verb_mismatch_is_authoritative_over_mounts() {
    // The parent owns "/users/{id}" with GET only; a mounted child under
    // "users" must not be consulted for the rejected POST.
    let mut child = Controller::new("child");
    child.register("/{id}", MethodTable::new().post(ok_handler("child_post")));

    let mut root = Controller::new("root");
    root.register("/users/{id}", MethodTable::new().get(ok_handler("get_user")));
    root.mount("users", Arc::new(child));

    let err = root.resolve(&Method::POST, "/users/42").unwrap_err();
    assert!(matches!(err, RouteError::MethodNotAllowed { .. }));
}

#[test]
fn test_nested_mounts() {
    let mut posts = Controller::new("posts");
    posts.register("/{post_id}", MethodTable::new().get(ok_handler("get_post")));

    let mut users = users_controller();
    users.mount("posts", Arc::new(posts));

    let mut root = Controller::new("root");
    root.mount("users", Arc::new(users));

    let m = root.resolve(&Method::GET, "/users/posts/abc").unwrap();
    assert_eq!(m.pattern, "/{post_id}");
    assert_eq!(m.path_params[0].1, "abc");
}
