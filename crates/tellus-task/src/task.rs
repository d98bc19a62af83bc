//! The resumable step contract and the stop probe handed to each slice.

use std::time::Instant;

use crate::handle::CancelFlag;

/// What a [`Resumable`] reports at the end of one slice of work.
#[derive(Debug)]
pub enum StepResult<T, E> {
    /// The slice budget ran out; call `resume` again next tick.
    Yielded,
    /// The task finished and produced its output.
    Complete(T),
    /// The task hit an unrecoverable error.
    Failed(E),
}

/// A job that makes progress in bounded slices.
///
/// Implementations keep their loop position in `self` so that work continues
/// exactly where it left off on the next `resume` call. Inner loops must poll
/// [`StopProbe::should_stop`] at a granularity fine enough to honor the slice
/// budget, and return [`StepResult::Yielded`] when it fires.
pub trait Resumable {
    type Output;
    type Error;

    fn resume(&mut self, probe: &mut StopProbe) -> StepResult<Self::Output, Self::Error>;
}

/// Deadline and cancellation probe for one slice.
///
/// `Instant::now` is too expensive to call per loop iteration at the scale of
/// millions of vertices, so the probe only consults the clock on every
/// `check_every`-th call and answers `false` in between.
#[derive(Debug)]
pub struct StopProbe {
    deadline: Instant,
    check_every: u32,
    calls: u32,
    cancel: CancelFlag,
}

impl StopProbe {
    pub(crate) fn new(deadline: Instant, check_every: u32, cancel: CancelFlag) -> Self {
        Self {
            deadline,
            // A zero interval would never probe; clamp to 1.
            check_every: check_every.max(1),
            calls: 0,
            cancel,
        }
    }

    /// Returns true when the slice should end, either because the deadline
    /// passed or the task was cancelled. Cheap on non-probing calls.
    #[inline]
    pub fn should_stop(&mut self) -> bool {
        self.calls += 1;
        if self.calls % self.check_every != 0 {
            return false;
        }
        self.cancel.is_cancelled() || Instant::now() >= self.deadline
    }

    /// True once the task's cancel flag is raised. Checked on every call,
    /// unlike `should_stop` which amortizes the clock read.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
