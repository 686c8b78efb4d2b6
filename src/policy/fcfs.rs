use crate::policy::SelectPolicy;
use crate::task::{Task, TaskId};

/// First-come-first-served baseline: always the queue head, no priorities,
/// no anti-repeat guard. Useful for comparing schedules against the hybrid
/// policy.
pub struct Fcfs;

impl SelectPolicy for Fcfs {
    fn select(&self, tasks: &[Task], _last_selected: Option<TaskId>) -> Option<usize> {
        if tasks.is_empty() {
            None
        } else {
            Some(0)
        }
    }
}
