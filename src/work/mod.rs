//! # Work Module
//!
//! The queue-and-wait synchronization core.
//!
//! ## Overview
//!
//! Request coroutines run concurrently, but every mutation of the dispatch
//! tree must run serialized. Instead of locking the tree, all tree access is
//! funneled through a single consumer coroutine:
//!
//! 1. A request coroutine wraps its computation as a `Workload` and sends
//!    it over the FIFO work channel (bounded-time enqueue).
//! 2. It then blocks on the workload's private reply channel. Blocking is
//!    coroutine-level: no OS thread is held.
//! 3. The [`WorkLoop`] coroutine removes workloads in FIFO order and runs
//!    each to completion with exclusive `&mut` access to the tree.
//! 4. The loop stores the result or the captured failure and fires the
//!    completion signal in a single channel send, establishing the
//!    happens-before edge the waiter needs.
//! 5. The submitter wakes and returns the result, or re-surfaces the
//!    failure with its original kind intact (`anyhow::Error` downcasting
//!    preserves concrete error types across the hand-off).
//!
//! ## Guarantees
//!
//! - Each workload is enqueued exactly once and completed exactly once.
//! - Workloads execute in submission order; a new computation never starts
//!   before the previous one's reply has been sent.
//! - A failing or panicking computation is captured and isolated; the loop
//!   always proceeds to the next queued workload.
//!
//! ## Limits
//!
//! Once enqueued, a workload always eventually runs; there is no
//! cancellation. [`WorkQueue::queue_and_wait_timeout`] bounds the caller's
//! wait, not the workload's execution.

mod work_loop;
mod workload;

pub use work_loop::{WorkLoop, WorkQueue};
