use serde_json::{json, Value};
use std::time::Duration;
use workfunnel::tree::ROOT_NODE_ID;
use workfunnel::{ControllerError, DispatchTree, WaitTimeout, WorkLoop};

mod common;
use common::test_runtime::setup_may_runtime;

fn spawn_loop() -> WorkLoop {
    setup_may_runtime();
    WorkLoop::spawn(DispatchTree::new(), 0x8000).unwrap()
}

#[test]
fn test_queue_and_wait_returns_stored_result() {
    let work_loop = spawn_loop();
    let queue = work_loop.queue();

    let result = queue.queue_and_wait(|_tree| Ok(json!(7))).unwrap();
    assert_eq!(result, json!(7));

    work_loop.shutdown();
}

#[test]
fn test_workload_mutations_are_visible_to_later_workloads() {
    let work_loop = spawn_loop();
    let queue = work_loop.queue();

    let id = queue
        .queue_and_wait(|tree| {
            let id = tree.create_child(ROOT_NODE_ID, "job", json!({"n": 1}))?;
            Ok(json!(id))
        })
        .unwrap();
    let id = id.as_u64().unwrap();

    let seen = queue
        .queue_and_wait(move |tree| {
            Ok(tree.node_json(id).unwrap_or(Value::Null))
        })
        .unwrap();
    assert_eq!(seen["name"], "job");
    assert_eq!(seen["data"]["n"], 1);

    work_loop.shutdown();
}

#[test]
fn test_error_kind_survives_the_loop() {
    let work_loop = spawn_loop();
    let queue = work_loop.queue();

    let err = queue
        .queue_and_wait(|tree| {
            tree.update_data(999, Value::Null)?;
            Ok(Value::Null)
        })
        .unwrap_err();
    let kind = err.downcast_ref::<ControllerError>().unwrap();
    assert_eq!(*kind, ControllerError::not_found("node 999"));

    work_loop.shutdown();
}

#[test]
fn test_workloads_run_in_submission_order() {
    let work_loop = spawn_loop();
    let queue = work_loop.queue();

    // Park the loop on a slow workload so all tagged workloads sit in the
    // queue together before any of them runs.
    let blocker = work_loop.queue();
    let slow = std::thread::spawn(move || {
        blocker.queue_and_wait(|_tree| {
            may::coroutine::sleep(Duration::from_millis(300));
            Ok(Value::Null)
        })
    });
    std::thread::sleep(Duration::from_millis(50));

    // Each workload appends its tag as a child of the root; the children
    // list records execution order. The bounded waits expire while the loop
    // is still parked, but the workloads stay queued in submission order.
    for tag in ["a", "b", "c"] {
        let err = queue
            .queue_and_wait_timeout(
                move |tree| {
                    tree.create_child(ROOT_NODE_ID, tag, Value::Null)?;
                    Ok(Value::Null)
                },
                Duration::from_millis(10),
            )
            .unwrap_err();
        assert!(err.is::<WaitTimeout>());
    }

    let names = queue
        .queue_and_wait(|tree| {
            let names: Vec<String> = tree
                .get(ROOT_NODE_ID)
                .map(|root| {
                    root.children
                        .iter()
                        .filter_map(|id| tree.get(*id))
                        .map(|n| n.name.clone())
                        .collect()
                })
                .unwrap_or_default();
            Ok(json!(names))
        })
        .unwrap();
    assert_eq!(names, json!(["a", "b", "c"]));

    slow.join().unwrap().unwrap();
    work_loop.shutdown();
}

#[test]
fn test_panicking_workload_does_not_kill_the_loop() {
    let work_loop = spawn_loop();
    let queue = work_loop.queue();

    let err = queue
        .queue_and_wait(|_tree| panic!("boom"))
        .unwrap_err();
    assert!(err.to_string().contains("boom"));

    // The loop is still alive and serving.
    let result = queue.queue_and_wait(|_tree| Ok(json!("alive"))).unwrap();
    assert_eq!(result, json!("alive"));

    work_loop.shutdown();
}

#[test]
fn test_bounded_wait_times_out() {
    let work_loop = spawn_loop();
    let queue = work_loop.queue();

    // Park the loop on a slow workload so the bounded wait expires first.
    let blocker = work_loop.queue();
    let slow = std::thread::spawn(move || {
        blocker.queue_and_wait(|_tree| {
            may::coroutine::sleep(Duration::from_millis(300));
            Ok(Value::Null)
        })
    });

    std::thread::sleep(Duration::from_millis(50));
    let err = queue
        .queue_and_wait_timeout(|_tree| Ok(Value::Null), Duration::from_millis(50))
        .unwrap_err();
    let timeout = err.downcast_ref::<WaitTimeout>().unwrap();
    assert_eq!(timeout.waited, Duration::from_millis(50));

    slow.join().unwrap().unwrap();
    work_loop.shutdown();
}

#[test]
fn test_bounded_wait_returns_fast_result() {
    let work_loop = spawn_loop();
    let queue = work_loop.queue();

    let result = queue
        .queue_and_wait_timeout(|_tree| Ok(json!(1)), Duration::from_secs(5))
        .unwrap();
    assert_eq!(result, json!(1));

    work_loop.shutdown();
}
