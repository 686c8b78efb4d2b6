use thiserror::Error;

/// Errors surfaced to task submitters.
///
/// Execution-time failures (child spawn, output send) are recovered inside
/// the executor and never reach the submitter; see the executor module.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The waiting queue is at capacity; the task was not enqueued.
    #[error("waiting queue is full ({capacity} tasks)")]
    QueueFull { capacity: usize },

    /// The scheduler has been stopped and accepts no new work.
    #[error("scheduler is shutting down")]
    Stopped,
}
