mod fcfs;
mod hybrid;

pub use fcfs::Fcfs;
pub use hybrid::HybridSrtf;

use crate::task::{Task, TaskId};

/// Chooses which queued task runs next.
///
/// `tasks` is the queue in arrival order (the FCFS tie-break), and
/// `last_selected` is the id of the most recently scheduled task. Returns
/// the index to remove, or `None` when the queue is empty. The queue calls
/// this with its lock held, so implementations must not block.
pub trait SelectPolicy: Send + Sync {
    fn select(&self, tasks: &[Task], last_selected: Option<TaskId>) -> Option<usize>;
}
