//! Turn queue and debouncing.
//!
//! [`Scheduler`] is the runtime's event loop queue: each scheduled task runs in
//! its own turn, after the synchronous work of the current turn has settled.
//! [`Debouncer`] coalesces a burst of calls into a single scheduled task where
//! the last call wins.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a scheduled task, used for cancellation.
    pub struct TaskId;
}

#[derive(Default)]
struct Queue {
    tasks: SlotMap<TaskId, Box<dyn FnOnce()>>,
    order: VecDeque<TaskId>,
}

/// FIFO queue of deferred tasks. Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct Scheduler {
    queue: Rc<RefCell<Queue>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defer `task` to a later turn.
    pub fn schedule(&self, task: impl FnOnce() + 'static) -> TaskId {
        let mut queue = self.queue.borrow_mut();
        let id = queue.tasks.insert(Box::new(task));
        queue.order.push_back(id);
        id
    }

    /// Cancel a pending task. Returns `false` if it already ran or was cancelled.
    pub fn cancel(&self, id: TaskId) -> bool {
        self.queue.borrow_mut().tasks.remove(id).is_some()
    }

    /// Run the next pending task. Returns `false` if nothing was pending.
    pub fn run_next(&self) -> bool {
        let task = {
            let mut queue = self.queue.borrow_mut();
            loop {
                let Some(id) = queue.order.pop_front() else {
                    break None;
                };
                // Cancelled tasks leave a stale id in `order`.
                if let Some(task) = queue.tasks.remove(id) {
                    break Some(task);
                }
            }
        };
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Number of tasks still waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.borrow().tasks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Collapses a burst of calls into one deferred execution.
///
/// Each [`call`](Debouncer::call) cancels the task scheduled by the previous
/// call and schedules its own, so at most one task is ever pending.
#[derive(Debug)]
pub struct Debouncer {
    scheduler: Scheduler,
    pending: Cell<Option<TaskId>>,
}

impl Debouncer {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            pending: Cell::new(None),
        }
    }

    pub fn call(&self, task: impl FnOnce() + 'static) {
        if let Some(previous) = self.pending.take() {
            self.scheduler.cancel(previous);
        }
        let id = self.scheduler.schedule(task);
        self.pending.set(Some(id));
    }

    /// Whether a call is waiting to run.
    pub fn is_pending(&self) -> bool {
        self.pending
            .get()
            .is_some_and(|id| self.scheduler.queue.borrow().tasks.contains_key(id))
    }
}
