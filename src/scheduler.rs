use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::SchedulerError;
use crate::executor::{ExecOutcome, Executor};
use crate::logging::{StateLog, Transition};
use crate::policy::SelectPolicy;
use crate::queue::WaitingQueue;
use crate::sink::OutputSink;
use crate::summary::{ScheduleSummary, SummaryEntry};
use crate::task::{Task, TaskId};

/// The scheduler: waiting queue, schedule summary, state log, and the
/// single worker thread that drains them.
///
/// Construction initializes the shared state; `start` spawns the worker;
/// `stop` (also run on drop) wakes it, joins it, and drains any summary
/// left over. Exactly one worker exists, so tasks never run in parallel.
pub struct Scheduler {
    queue: Arc<WaitingQueue>,
    summary: Arc<ScheduleSummary>,
    log: Arc<StateLog>,
    tick: Duration,
    policy: Option<Box<dyn SelectPolicy>>,
    worker: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// A scheduler with the production tick of one second per simulated
    /// second of work.
    pub fn new(policy: Box<dyn SelectPolicy>) -> Self {
        Self::with_tick(policy, Duration::from_secs(1))
    }

    /// A scheduler with a custom tick; tests shrink it to milliseconds.
    pub fn with_tick(policy: Box<dyn SelectPolicy>, tick: Duration) -> Self {
        Self {
            queue: Arc::new(WaitingQueue::new()),
            summary: Arc::new(ScheduleSummary::new()),
            log: Arc::new(StateLog::new()),
            tick,
            policy: Some(policy),
            worker: None,
        }
    }

    /// Spawns the worker thread. Call once; later calls are no-ops.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }
        let Some(policy) = self.policy.take() else {
            return;
        };
        let queue = Arc::clone(&self.queue);
        let executor = Executor::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.summary),
            Arc::clone(&self.log),
            self.tick,
        );
        let handle = thread::Builder::new()
            .name("timeslice-worker".into())
            .spawn(move || {
                while let Some(mut task) = queue.take_next(&*policy) {
                    match executor.run(&mut task) {
                        ExecOutcome::Completed => drop(task),
                        ExecOutcome::Preempted | ExecOutcome::Yielded => queue.requeue(task),
                    }
                }
                tracing::debug!("scheduler worker exited");
            })
            .expect("failed to spawn scheduler worker");
        self.worker = Some(handle);
    }

    /// Classifies `command`, logs the submitter-side transitions, and
    /// enqueues the task. `QueueFull` and `Stopped` are surfaced so the
    /// caller can report them on the client channel.
    pub fn submit(
        &self,
        command: &str,
        client: u32,
        sink: Arc<dyn OutputSink>,
    ) -> Result<(), SchedulerError> {
        let task = Task::new(command, client, sink);
        // the submitting thread logs created and started; the worker logs
        // running/waiting/ended
        self.log
            .transition(client, Transition::Created, task.remaining_burst());
        self.log
            .transition(client, Transition::Started, task.remaining_burst());
        self.queue.push(task, &self.summary)
    }

    /// Removes a specific queued task, returning its ownership.
    pub fn remove_task(&self, id: TaskId) -> Option<Task> {
        self.queue.remove_by_id(id)
    }

    /// Purges every queued task of a disconnected client. A task of theirs
    /// already running finishes its quantum; its sends fail silently.
    pub fn remove_client(&self, client: u32) {
        let purged = self.queue.remove_for_client(client);
        if purged > 0 {
            tracing::debug!(client, purged, "purged tasks for disconnected client");
        }
    }

    /// Signals the worker to stop, joins it, and drains the summary if it
    /// has entries. Queued tasks are freed with the queue.
    pub fn stop(&mut self) {
        self.queue.close();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        if let Some(line) = self.summary.drain() {
            self.log.summary(&line);
        }
    }

    /// The shared state log, so the server emits its side-channel lines
    /// under the same logging mutex.
    pub fn log(&self) -> Arc<StateLog> {
        Arc::clone(&self.log)
    }

    /// True when nothing is queued and nothing is running.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.summary.running().is_none()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Snapshot of the not-yet-drained summary entries.
    pub fn summary_entries(&self) -> Vec<SummaryEntry> {
        self.summary.entries()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
