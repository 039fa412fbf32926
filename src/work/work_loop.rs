use crate::error::WaitTimeout;
use crate::tree::DispatchTree;
use may::coroutine::{self, JoinHandle};
use may::sync::mpsc;
use serde_json::Value;
use std::io;
use std::time::Duration;
use tracing::{debug, info};

use super::workload::{Computation, Reply, Workload};

/// The single serialized execution context.
///
/// `spawn` moves the dispatch tree into a dedicated coroutine that removes
/// workloads from a FIFO channel one at a time and runs each to completion
/// before taking the next. Mutual exclusion over the tree is structural:
/// there is exactly one consumer and the tree never leaves its coroutine.
///
/// The loop exits when every [`WorkQueue`] handle has been dropped; a
/// failing or panicking workload never terminates it.
pub struct WorkLoop {
    queue: WorkQueue,
    handle: JoinHandle<()>,
}

impl WorkLoop {
    /// Spawn the loop coroutine, taking ownership of the tree.
    ///
    /// `stack_size` is the loop coroutine's stack in bytes (see
    /// [`RuntimeConfig`](crate::config::RuntimeConfig) for the environment
    /// knob).
    ///
    /// # Errors
    ///
    /// Returns an error if the coroutine cannot be spawned.
    pub fn spawn(tree: DispatchTree, stack_size: usize) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<Workload>();

        // SAFETY: may::coroutine::Builder::spawn() is marked unsafe by the
        // may runtime. The closure owns everything it touches (the tree and
        // the receiver are moved in) and holds no borrowed references, and
        // the loop is spawned during initialization when the runtime is set
        // up.
        let handle = unsafe {
            coroutine::Builder::new()
                .name("work_loop".to_string())
                .stack_size(stack_size)
                .spawn(move || {
                    info!(stack_size, "Work loop started");
                    let mut tree = tree;
                    let mut executed: u64 = 0;
                    for workload in rx.iter() {
                        workload.run(&mut tree);
                        executed += 1;
                    }
                    info!(executed, "Work loop drained; shutting down");
                })
        }?;

        Ok(Self {
            queue: WorkQueue { tx },
            handle,
        })
    }

    /// A cloneable producer handle for submitting work.
    pub fn queue(&self) -> WorkQueue {
        self.queue.clone()
    }

    /// Drop this loop's own queue handle and wait for the loop to drain.
    ///
    /// Pending workloads still run. Blocks until every other [`WorkQueue`]
    /// clone has been dropped as well.
    pub fn shutdown(self) {
        let WorkLoop { queue, handle } = self;
        drop(queue);
        let _ = handle.join();
    }
}

/// Producer side of the work queue.
///
/// Cloneable and cheap to clone; every request coroutine can hold one.
#[derive(Clone)]
pub struct WorkQueue {
    tx: mpsc::Sender<Workload>,
}

impl WorkQueue {
    /// Queue a computation onto the work loop and block until it completes,
    /// returning its stored result or re-surfacing its stored failure with
    /// the original error kind intact.
    ///
    /// The enqueue itself is bounded (an unbounded channel send); the wait
    /// is not. For a bounded wait use [`queue_and_wait_timeout`].
    ///
    /// Workloads run in submission order: if A is enqueued before B, A's
    /// computation fully completes before B's starts.
    ///
    /// [`queue_and_wait_timeout`]: WorkQueue::queue_and_wait_timeout
    pub fn queue_and_wait<F>(&self, computation: F) -> anyhow::Result<Value>
    where
        F: FnOnce(&mut DispatchTree) -> anyhow::Result<Value> + Send + 'static,
    {
        self.submit(Box::new(computation), None)
    }

    /// Like [`queue_and_wait`](WorkQueue::queue_and_wait), but give up
    /// waiting after `timeout` and fail with
    /// [`WaitTimeout`](crate::error::WaitTimeout).
    ///
    /// Once enqueued a workload always eventually runs; the timeout bounds
    /// only the caller's wait, not the workload's execution. Its eventual
    /// reply is delivered to a dropped receiver and discarded.
    pub fn queue_and_wait_timeout<F>(
        &self,
        computation: F,
        timeout: Duration,
    ) -> anyhow::Result<Value>
    where
        F: FnOnce(&mut DispatchTree) -> anyhow::Result<Value> + Send + 'static,
    {
        self.submit(Box::new(computation), Some(timeout))
    }

    fn submit(&self, computation: Computation, timeout: Option<Duration>) -> anyhow::Result<Value> {
        let (reply_tx, reply_rx) = mpsc::channel::<Reply>();
        let workload = Workload::new(computation, reply_tx.clone());

        self.tx
            .send(workload)
            .map_err(|_| anyhow::anyhow!("work loop is shut down"))?;
        debug!(bounded = timeout.is_some(), "Workload enqueued");

        match timeout {
            Some(limit) => {
                // may::sync::mpsc has no recv_timeout, so a timer coroutine
                // races the workload on the same reply channel. Whichever
                // message arrives first decides the outcome; the loser's
                // send lands on a dropped receiver.
                //
                // SAFETY: may::coroutine::spawn() is marked unsafe by the
                // may runtime. The timer closure owns its sender and
                // duration and borrows nothing.
                let timer_tx = reply_tx;
                unsafe {
                    coroutine::spawn(move || {
                        coroutine::sleep(limit);
                        let _ = timer_tx.send(Reply::TimedOut);
                    });
                }
                match reply_rx.recv() {
                    Ok(Reply::Finished(outcome)) => outcome,
                    Ok(Reply::TimedOut) => Err(WaitTimeout { waited: limit }.into()),
                    Err(_) => Err(anyhow::anyhow!("work loop dropped the reply channel")),
                }
            }
            None => {
                // Drop our clone so a vanished loop surfaces as a recv
                // error instead of a hang.
                drop(reply_tx);
                match reply_rx.recv() {
                    Ok(Reply::Finished(outcome)) => outcome,
                    // No timer was started on this channel
                    Ok(Reply::TimedOut) => Err(anyhow::anyhow!("spurious timeout signal")),
                    Err(_) => Err(anyhow::anyhow!("work loop dropped the reply channel")),
                }
            }
        }
    }
}
