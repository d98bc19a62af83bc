//! Task observation: status, outcome, cancellation, and continuations.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag. Clones observe the same flag, and the flag may
/// be raised from another thread even though tasks themselves run on one.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Lifecycle of a spawned task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Spawned but not yet given a slice.
    Pending,
    /// Has run at least one slice and is not settled.
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl TaskStatus {
    /// True for the three terminal states. A settled task never runs again.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Cancelled | TaskStatus::Failed
        )
    }
}

/// Terminal result of a task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskOutcome<T, E> {
    Completed(T),
    Cancelled,
    Failed(E),
}

impl<T, E> TaskOutcome<T, E> {
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskOutcome::Completed(_) => TaskStatus::Completed,
            TaskOutcome::Cancelled => TaskStatus::Cancelled,
            TaskOutcome::Failed(_) => TaskStatus::Failed,
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskOutcome::Completed(_))
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskOutcome::Cancelled)
    }

    /// Consumes the outcome, keeping the success value if there is one.
    #[must_use]
    pub fn completed(self) -> Option<T> {
        match self {
            TaskOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }
}

type Continuation<T, E> = Box<dyn FnOnce(&TaskOutcome<T, E>)>;

/// State shared between a [`TaskHandle`] and the runner's driver slot.
pub(crate) struct TaskShared<T, E> {
    status: Cell<TaskStatus>,
    outcome: RefCell<Option<TaskOutcome<T, E>>>,
    cancel: CancelFlag,
    continuations: RefCell<Vec<Continuation<T, E>>>,
}

impl<T, E> TaskShared<T, E> {
    pub(crate) fn new(cancel: CancelFlag) -> Rc<Self> {
        Rc::new(Self {
            status: Cell::new(TaskStatus::Pending),
            outcome: RefCell::new(None),
            cancel,
            continuations: RefCell::new(Vec::new()),
        })
    }

    pub(crate) fn status(&self) -> TaskStatus {
        self.status.get()
    }

    pub(crate) fn mark_running(&self) {
        if self.status.get() == TaskStatus::Pending {
            self.status.set(TaskStatus::Running);
        }
    }

    pub(crate) fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Records the terminal outcome and fires queued continuations.
    /// A task settles exactly once; later calls are ignored.
    pub(crate) fn settle(&self, outcome: TaskOutcome<T, E>) {
        if self.status.get().is_settled() {
            debug_assert!(false, "task settled twice");
            return;
        }
        self.status.set(outcome.status());
        // No cell borrow may be held here: continuations are user code and
        // can touch this task through a cloned handle.
        let pending: Vec<_> = self.continuations.borrow_mut().drain(..).collect();
        for run in pending {
            run(&outcome);
        }
        *self.outcome.borrow_mut() = Some(outcome);
    }
}

/// Owner-side view of a spawned task.
///
/// Cheap to clone; all clones observe the same task. Dropping every handle
/// does not stop the task, it keeps running until settled or cancelled.
pub struct TaskHandle<T, E> {
    shared: Rc<TaskShared<T, E>>,
}

impl<T, E> Clone for TaskHandle<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T, E> TaskHandle<T, E> {
    pub(crate) fn new(shared: Rc<TaskShared<T, E>>) -> Self {
        Self { shared }
    }

    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.shared.status()
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.shared.status().is_settled()
    }

    /// Requests cooperative cancellation. The task observes the flag through
    /// its [`crate::StopProbe`] and settles as `Cancelled` on the runner's
    /// next opportunity; work already done is the caller's to discard.
    pub fn cancel(&self) {
        self.shared.cancel.cancel();
    }

    /// The flag raised by [`TaskHandle::cancel`]. Useful for wiring the same
    /// cancellation into systems that do not hold the handle.
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.shared.cancel.clone()
    }

    /// Takes the outcome out of the handle. Returns `None` while the task is
    /// still running, and on every call after the first successful take.
    #[must_use]
    pub fn take_outcome(&self) -> Option<TaskOutcome<T, E>> {
        self.shared.outcome.borrow_mut().take()
    }

    /// Clones the outcome without consuming it. `None` until settled.
    #[must_use]
    pub fn outcome(&self) -> Option<TaskOutcome<T, E>>
    where
        T: Clone,
        E: Clone,
    {
        self.shared.outcome.borrow().clone()
    }
}

impl<T: 'static, E: Clone + 'static> TaskHandle<T, E> {
    /// Derives a new handle whose value is `map` applied to this task's
    /// output. Cancellation and failure pass through unchanged, and the
    /// derived handle shares this task's cancel flag, so cancelling the
    /// derived handle cancels the source task too.
    ///
    /// If the source already settled, `map` runs immediately. A handle whose
    /// outcome was consumed by [`TaskHandle::take_outcome`] before `then` has
    /// nothing to derive from; the returned handle then never settles.
    pub fn then<U: 'static, F>(&self, map: F) -> TaskHandle<U, E>
    where
        F: FnOnce(&T) -> U + 'static,
    {
        let derived = TaskShared::new(self.shared.cancel.clone());
        let sink = Rc::clone(&derived);
        let apply = move |outcome: &TaskOutcome<T, E>| {
            let mapped = match outcome {
                TaskOutcome::Completed(value) => TaskOutcome::Completed(map(value)),
                TaskOutcome::Cancelled => TaskOutcome::Cancelled,
                TaskOutcome::Failed(err) => TaskOutcome::Failed(err.clone()),
            };
            sink.settle(mapped);
        };
        if self.shared.status().is_settled() {
            // The map is user code and may reach this task through another
            // handle; it runs with the outcome out of the cell and no borrow
            // held, exactly as a queued continuation does at settlement.
            let taken = self.shared.outcome.borrow_mut().take();
            if let Some(outcome) = taken {
                apply(&outcome);
                *self.shared.outcome.borrow_mut() = Some(outcome);
            }
        } else {
            self.shared
                .continuations
                .borrow_mut()
                .push(Box::new(apply));
        }
        TaskHandle::new(derived)
    }
}
