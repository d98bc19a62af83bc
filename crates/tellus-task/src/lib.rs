//! Cooperative, cancellable task scheduling on a single thread.
//!
//! Long-running jobs implement [`Resumable`]: a step function that does a
//! bounded amount of work, polls a [`StopProbe`], and yields back to the
//! caller when the probe fires. A [`TickRunner`] drives every spawned task
//! one time slice per [`TickRunner::tick`] call, so heavy work (like planet
//! mesh generation) interleaves with a frame loop instead of stalling it.
//!
//! Each spawned task is observed through a [`TaskHandle`], which exposes the
//! task status, its final [`TaskOutcome`], cooperative cancellation, and
//! [`TaskHandle::then`] continuations that derive follow-up values once the
//! task settles.

mod handle;
mod runner;
mod task;

pub use handle::{CancelFlag, TaskHandle, TaskOutcome, TaskStatus};
pub use runner::{RunnerConfig, TickRunner};
pub use task::{Resumable, StepResult, StopProbe};
