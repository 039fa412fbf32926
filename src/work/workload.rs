use crate::tree::DispatchTree;
use may::sync::mpsc;
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::error;

/// The deferred computation carried by a workload.
pub type Computation = Box<dyn FnOnce(&mut DispatchTree) -> anyhow::Result<Value> + Send>;

/// What comes back over a workload's reply channel.
///
/// `Finished` carries the stored result or captured failure; `TimedOut` is
/// posted by the timer coroutine of a bounded wait and never by the work
/// loop itself.
#[derive(Debug)]
pub(crate) enum Reply {
    Finished(anyhow::Result<Value>),
    TimedOut,
}

/// A unit of deferred computation handed from a request coroutine to the
/// work loop.
///
/// The reply channel doubles as completion signal and result slot: the
/// single `send` after the computation finishes stores the result (or the
/// captured failure) and wakes the waiting submitter in one step, so the
/// waiter always observes a fully-built outcome. Each workload is enqueued
/// exactly once and completed exactly once.
pub struct Workload {
    computation: Computation,
    reply_tx: mpsc::Sender<Reply>,
}

impl Workload {
    pub(crate) fn new(computation: Computation, reply_tx: mpsc::Sender<Reply>) -> Self {
        Self {
            computation,
            reply_tx,
        }
    }

    /// Run the computation to completion and send the one reply.
    ///
    /// A panicking computation is caught and stored as a failure; it never
    /// propagates into the loop. The send result is ignored: a submitter
    /// that gave up waiting (bounded wait) has dropped its receiver, and
    /// that must not disturb the loop.
    pub(crate) fn run(self, tree: &mut DispatchTree) {
        let Workload {
            computation,
            reply_tx,
        } = self;
        let outcome = match catch_unwind(AssertUnwindSafe(|| computation(tree))) {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(&panic);
                error!(panic = %message, "Work item panicked");
                Err(anyhow::anyhow!("work item panicked: {message}"))
            }
        };
        let _ = reply_tx.send(Reply::Finished(outcome));
    }
}

impl std::fmt::Debug for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Workload")
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
