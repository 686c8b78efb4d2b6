use std::sync::{Condvar, Mutex, MutexGuard};

use crate::error::SchedulerError;
use crate::policy::SelectPolicy;
use crate::summary::ScheduleSummary;
use crate::task::{Task, TaskId, TaskState};

/// Queue capacity; a push beyond this is rejected with `QueueFull`.
pub const MAX_TASKS: usize = 100;

/// Thread-safe bounded collection of pending tasks.
///
/// Arrival order is preserved among the tasks not yet removed; that order
/// is the FCFS tie-break the selection policies rely on. A condition
/// variable wakes the scheduler worker when the queue turns non-empty, and
/// `last_selected` feeds the no-consecutive-selection rule.
pub struct WaitingQueue {
    inner: Mutex<Inner>,
    not_empty: Condvar,
}

struct Inner {
    tasks: Vec<Task>,
    last_selected: Option<TaskId>,
    closed: bool,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                tasks: Vec::new(),
                last_selected: None,
                closed: false,
            }),
            not_empty: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("waiting queue mutex poisoned")
    }

    /// Appends `task` at the tail and signals readiness.
    ///
    /// When the queue was empty the summary epoch is re-anchored if the
    /// whole system is idle (nothing recorded, nothing running); the
    /// summary lock nests inside the queue lock here and nowhere else.
    pub fn push(&self, mut task: Task, summary: &ScheduleSummary) -> Result<(), SchedulerError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(SchedulerError::Stopped);
        }
        if inner.tasks.len() >= MAX_TASKS {
            return Err(SchedulerError::QueueFull {
                capacity: MAX_TASKS,
            });
        }
        if inner.tasks.is_empty() {
            summary.reset_if_idle();
        }
        task.state = TaskState::Waiting;
        inner.tasks.push(task);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Returns a yielded or preempted task to the tail.
    ///
    /// Only the scheduler worker calls this, right before it loops back to
    /// select again, so no readiness signal is needed. The idle-reset rule
    /// does not apply: a yielded program has just recorded a summary entry.
    pub fn requeue(&self, task: Task) {
        let mut inner = self.lock();
        if inner.tasks.len() >= MAX_TASKS {
            tracing::warn!(task = task.id(), "queue full on requeue; dropping task");
            return;
        }
        inner.tasks.push(task);
    }

    /// Blocks until the queue is non-empty (or closed), then removes and
    /// returns the task chosen by `policy`, updating `last_selected`.
    /// Returns `None` once the queue is closed.
    pub fn take_next(&self, policy: &dyn SelectPolicy) -> Option<Task> {
        let mut inner = self.lock();
        while inner.tasks.is_empty() && !inner.closed {
            inner = self
                .not_empty
                .wait(inner)
                .expect("waiting queue condvar poisoned");
        }
        if inner.closed {
            return None;
        }
        let idx = policy.select(&inner.tasks, inner.last_selected)?;
        let task = inner.tasks.remove(idx);
        inner.last_selected = Some(task.id());
        Some(task)
    }

    /// Removes the first task with `id`, preserving the order of the rest.
    pub fn remove_by_id(&self, id: TaskId) -> Option<Task> {
        let mut inner = self.lock();
        let idx = inner.tasks.iter().position(|t| t.id() == id)?;
        Some(inner.tasks.remove(idx))
    }

    /// Purges every queued task belonging to `client`. Idempotent; returns
    /// how many tasks were dropped.
    pub fn remove_for_client(&self, client: u32) -> usize {
        let mut inner = self.lock();
        let before = inner.tasks.len();
        inner.tasks.retain(|t| t.client() != client);
        before - inner.tasks.len()
    }

    /// The preemption predicate, evaluated under the lock: any queued shell
    /// task, or any program with `0 < remaining < remaining_burst`.
    pub fn has_preempting_peer(&self, remaining_burst: i32) -> bool {
        let inner = self.lock();
        inner.tasks.iter().any(|t| {
            t.is_shell() || (t.remaining_burst() > 0 && t.remaining_burst() < remaining_burst)
        })
    }

    /// Closes the queue and wakes the worker so shutdown can proceed.
    /// Tasks still queued are dropped with the queue.
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        self.not_empty.notify_all();
    }

    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().tasks.is_empty()
    }

    pub fn last_selected(&self) -> Option<TaskId> {
        self.lock().last_selected
    }
}

impl Default for WaitingQueue {
    fn default() -> Self {
        Self::new()
    }
}
