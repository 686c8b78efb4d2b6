use crate::policy::SelectPolicy;
use crate::task::{Task, TaskId};

/// The hybrid selection rule: shell priority, then shortest remaining time,
/// with a no-consecutive-selection guard and FCFS tie-breaks.
///
/// A task is eligible unless it was the last one selected, except when it is
/// the only task in the queue. Shell tasks carry the `-1` burst sentinel, so
/// when one slips past rule 1 into the SRTF pass it still sorts first.
pub struct HybridSrtf;

impl HybridSrtf {
    fn eligible(task: &Task, last_selected: Option<TaskId>, queue_len: usize) -> bool {
        last_selected != Some(task.id) || queue_len == 1
    }
}

impl SelectPolicy for HybridSrtf {
    fn select(&self, tasks: &[Task], last_selected: Option<TaskId>) -> Option<usize> {
        if tasks.is_empty() {
            return None;
        }

        // 1. shell commands have absolute priority
        if let Some(idx) = tasks
            .iter()
            .position(|t| t.is_shell() && Self::eligible(t, last_selected, tasks.len()))
        {
            return Some(idx);
        }

        // 2. shortest remaining time first; earliest in queue wins ties
        let mut best: Option<(usize, i32)> = None;
        for (idx, task) in tasks.iter().enumerate() {
            if !Self::eligible(task, last_selected, tasks.len()) {
                continue;
            }
            match best {
                Some((_, shortest)) if task.remaining_burst >= shortest => {}
                _ => best = Some((idx, task.remaining_burst)),
            }
        }
        if let Some((idx, _)) = best {
            return Some(idx);
        }

        // 3. everything was excluded by the no-consecutive rule
        Some(0)
    }
}
