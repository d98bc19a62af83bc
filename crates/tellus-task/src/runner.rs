//! The single-threaded tick runner that drives resumable tasks.

use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::handle::{CancelFlag, TaskHandle, TaskOutcome, TaskShared};
use crate::task::{Resumable, StepResult, StopProbe};

/// Slice budget shared by every task a runner drives.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Wall-clock budget for one slice of one task.
    pub max_slice: Duration,
    /// How many [`StopProbe::should_stop`] calls pass between clock reads.
    pub check_every: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_slice: Duration::from_millis(50),
            check_every: 1000,
        }
    }
}

/// Type-erased driver slot so one runner can hold tasks of mixed
/// output/error types.
trait Drive {
    /// Runs one slice. Returns true once the task has settled.
    fn drive(&mut self, config: &RunnerConfig) -> bool;
}

struct Driver<R: Resumable> {
    /// `None` once settled; dropping the task releases its resources.
    task: Option<R>,
    shared: Rc<TaskShared<R::Output, R::Error>>,
}

impl<R: Resumable> Drive for Driver<R> {
    fn drive(&mut self, config: &RunnerConfig) -> bool {
        let Some(task) = self.task.as_mut() else {
            return true;
        };
        // Cancellation observed before the slice starts settles without
        // resuming the task at all.
        if self.shared.cancel_flag().is_cancelled() {
            self.task = None;
            debug!("task cancelled before slice");
            self.shared.settle(TaskOutcome::Cancelled);
            return true;
        }
        self.shared.mark_running();

        let start = Instant::now();
        let mut probe = StopProbe::new(
            start + config.max_slice,
            config.check_every,
            self.shared.cancel_flag().clone(),
        );
        let result = task.resume(&mut probe);

        let elapsed = start.elapsed();
        if elapsed > config.max_slice + config.max_slice / 10 {
            warn!(
                "task slice overran its budget: {elapsed:?} spent against {:?} (probe too coarse?)",
                config.max_slice
            );
        }

        match result {
            StepResult::Yielded => {
                // Cancellation that arrived during the slice settles now
                // instead of waiting for the next tick.
                if self.shared.cancel_flag().is_cancelled() {
                    self.task = None;
                    self.shared.settle(TaskOutcome::Cancelled);
                    return true;
                }
                false
            }
            StepResult::Complete(value) => {
                // A task that finished during its slice completes even if a
                // cancel raced in; the work is already done.
                self.task = None;
                self.shared.settle(TaskOutcome::Completed(value));
                true
            }
            StepResult::Failed(err) => {
                self.task = None;
                if self.shared.cancel_flag().is_cancelled() {
                    // Errors surfaced while bailing out of a cancelled task
                    // must not mask the cancellation.
                    self.shared.settle(TaskOutcome::Cancelled);
                } else {
                    self.shared.settle(TaskOutcome::Failed(err));
                }
                true
            }
        }
    }
}

/// Pull-driven cooperative scheduler.
///
/// `tick` gives every live task one slice, in spawn order. The runner owns
/// the tasks; callers keep [`TaskHandle`]s to observe and cancel them.
pub struct TickRunner {
    config: RunnerConfig,
    tasks: Vec<Box<dyn Drive>>,
}

impl TickRunner {
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            tasks: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Queues a task. It gets its first slice on the next [`TickRunner::tick`].
    pub fn spawn<R>(&mut self, task: R) -> TaskHandle<R::Output, R::Error>
    where
        R: Resumable + 'static,
        R::Output: 'static,
        R::Error: 'static,
    {
        let shared = TaskShared::new(CancelFlag::new());
        let handle = TaskHandle::new(Rc::clone(&shared));
        self.tasks.push(Box::new(Driver {
            task: Some(task),
            shared,
        }));
        handle
    }

    /// Gives each live task one slice and drops the settled ones.
    /// Returns the number of tasks still live.
    pub fn tick(&mut self) -> usize {
        let config = self.config.clone();
        self.tasks.retain_mut(|slot| !slot.drive(&config));
        self.tasks.len()
    }

    /// Number of tasks that have not settled.
    #[must_use]
    pub fn live_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Ticks until no live task remains. Intended for batch callers and
    /// tests; frame loops call [`TickRunner::tick`] once per frame instead.
    pub fn run_to_idle(&mut self) {
        while self.tick() > 0 {}
    }
}

impl Default for TickRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}
