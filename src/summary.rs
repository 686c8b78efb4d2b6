use std::sync::Mutex;
use std::time::Instant;

use crate::queue::MAX_TASKS;
use crate::task::TaskId;

/// Most entries the summary retains; later records are silently dropped.
pub const SUMMARY_CAPACITY: usize = MAX_TASKS * 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryEntry {
    pub task_id: TaskId,
    /// Seconds since the summary epoch when the round finished.
    pub at_secs: u64,
}

/// Append-only log of program scheduling rounds, plus the epoch the
/// elapsed-seconds clock is anchored to and the currently running task id.
///
/// One mutex guards all three: the idle-reset rule needs to observe the
/// entries and the running id in the same critical section.
pub struct ScheduleSummary {
    inner: Mutex<Inner>,
}

struct Inner {
    start: Instant,
    entries: Vec<SummaryEntry>,
    running: Option<TaskId>,
}

impl ScheduleSummary {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                start: Instant::now(),
                entries: Vec::new(),
                running: None,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("schedule summary mutex poisoned")
    }

    /// Whole seconds since the summary epoch.
    pub fn elapsed_secs(&self) -> u64 {
        self.lock().start.elapsed().as_secs()
    }

    /// Records one executed round for a program task.
    pub fn record(&self, task_id: TaskId) {
        let mut inner = self.lock();
        if inner.entries.len() >= SUMMARY_CAPACITY {
            return;
        }
        let at_secs = inner.start.elapsed().as_secs();
        inner.entries.push(SummaryEntry { task_id, at_secs });
    }

    pub fn set_running(&self, task_id: Option<TaskId>) {
        self.lock().running = task_id;
    }

    pub fn running(&self) -> Option<TaskId> {
        self.lock().running
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Snapshot of the recorded rounds, oldest first.
    pub fn entries(&self) -> Vec<SummaryEntry> {
        self.lock().entries.clone()
    }

    /// Re-anchors the epoch, but only when the system is fully idle:
    /// nothing recorded and nothing running. Called with the queue lock
    /// held, when the queue is empty, so the three-way idle check holds.
    pub fn reset_if_idle(&self) {
        let mut inner = self.lock();
        if inner.entries.is_empty() && inner.running.is_none() {
            inner.start = Instant::now();
        }
    }

    /// Renders and clears the recorded rounds: `P{id}-({t})-P{id}-({t})-…`.
    /// Returns `None` when there is nothing to drain.
    pub fn drain(&self) -> Option<String> {
        let mut inner = self.lock();
        if inner.entries.is_empty() {
            return None;
        }
        let line = inner
            .entries
            .iter()
            .map(|e| format!("P{}-({})", e.task_id, e.at_secs))
            .collect::<Vec<_>>()
            .join("-");
        inner.entries.clear();
        Some(line)
    }
}

impl Default for ScheduleSummary {
    fn default() -> Self {
        Self::new()
    }
}
