use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::logging::{StateLog, Transition};
use crate::queue::WaitingQueue;
use crate::summary::ScheduleSummary;
use crate::task::{Task, TaskKind, TaskState, OUTPUT_BUFFER_LIMIT};

/// Quantum granted on a task's first round, in ticks.
pub const FIRST_ROUND_QUANTUM: i32 = 3;
/// Quantum granted on every later round, in ticks.
pub const DEFAULT_QUANTUM: i32 = 7;

/// What happened to a task during one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecOutcome {
    /// Ran out of work; the task is finished and must be dropped.
    Completed,
    /// A preempting peer appeared mid-quantum; re-enqueue at the tail.
    Preempted,
    /// Used up its quantum with work left; re-enqueue at the tail.
    Yielded,
}

/// Runs one selected task for a round: shells to completion in a child
/// process, programs for up to one quantum of one-tick iterations with a
/// preemption poll after every tick.
pub(crate) struct Executor {
    queue: Arc<WaitingQueue>,
    summary: Arc<ScheduleSummary>,
    log: Arc<StateLog>,
    /// Length of one simulated second. One real second in production;
    /// tests shrink it to keep the scenarios fast.
    tick: Duration,
}

impl Executor {
    pub(crate) fn new(
        queue: Arc<WaitingQueue>,
        summary: Arc<ScheduleSummary>,
        log: Arc<StateLog>,
        tick: Duration,
    ) -> Self {
        Self {
            queue,
            summary,
            log,
            tick,
        }
    }

    /// Runs `task` for one round and applies the resulting transition:
    /// logging, summary entries, output delivery, and the end-of-batch
    /// summary drain. The caller only re-enqueues or drops the task.
    pub(crate) fn run(&self, task: &mut Task) -> ExecOutcome {
        if task.started_at.is_none() {
            task.started_at = Some(Instant::now());
        }
        task.state = TaskState::Running;
        self.summary.set_running(Some(task.id));
        self.log
            .transition(task.client, Transition::Running, task.remaining_burst);

        let outcome = match task.kind {
            TaskKind::Shell => {
                self.run_shell(task);
                ExecOutcome::Completed
            }
            TaskKind::Program => self.run_program(task),
        };
        self.summary.set_running(None);

        match outcome {
            ExecOutcome::Completed => self.finish(task),
            ExecOutcome::Preempted | ExecOutcome::Yielded => {
                task.state = TaskState::Waiting;
                self.log
                    .transition(task.client, Transition::Waiting, task.remaining_burst);
                self.summary.record(task.id);
            }
        }
        outcome
    }

    fn finish(&self, task: &mut Task) {
        task.ended_at = Some(Instant::now());
        task.state = TaskState::Ended;
        self.log
            .transition(task.client, Transition::Ended, task.remaining_burst);

        match task.kind {
            TaskKind::Shell => {
                // captured bytes, or a lone newline so the client prompt
                // still advances
                let sent = if task.output.is_empty() {
                    let _ = task.sink.send(b"\n");
                    1
                } else {
                    let _ = task.sink.send(&task.output);
                    task.output.len()
                };
                self.log.bytes_sent(task.client, sent);
            }
            TaskKind::Program => {
                self.summary.record(task.id);
                // 12 bytes per "Demo i/N\n" line, near enough
                self.log
                    .bytes_sent(task.client, task.current_iteration as usize * 12);
            }
        }
        tracing::debug!(task = task.id, command = %task.command, "task ended");

        if self.queue.is_empty() {
            if let Some(line) = self.summary.drain() {
                self.log.summary(&line);
            }
        }
    }

    /// Runs the command string to completion under `/bin/sh`, capturing
    /// stdout and stderr. Spawn failure degrades to empty output; the task
    /// still ends normally.
    fn run_shell(&self, task: &mut Task) {
        let result = Command::new("/bin/sh")
            .arg("-c")
            .arg(&task.command)
            .stdin(Stdio::null())
            .output();
        match result {
            Ok(output) => {
                let mut captured = output.stdout;
                captured.extend_from_slice(&output.stderr);
                captured.truncate(OUTPUT_BUFFER_LIMIT);
                task.output = captured;
            }
            Err(err) => {
                tracing::warn!(task = task.id, %err, "shell child spawn failed");
                task.output.clear();
            }
        }
    }

    /// One quantum of simulated work: emit the progress line, sleep one
    /// tick, advance the counters, then poll the queue for a preempting
    /// peer. The queue lock is held only for the poll itself.
    fn run_program(&self, task: &mut Task) -> ExecOutcome {
        let quantum = if task.round == 0 {
            FIRST_ROUND_QUANTUM
        } else {
            DEFAULT_QUANTUM
        };
        let iterations = quantum.min(task.remaining_burst);

        for _ in 0..iterations {
            let line = format!("Demo {}/{}\n", task.current_iteration + 1, task.total_burst);
            if let Err(err) = task.sink.send(line.as_bytes()) {
                // client is gone; per-client cleanup will purge the rest
                tracing::debug!(task = task.id, %err, "output send failed");
            }

            thread::sleep(self.tick);
            task.current_iteration += 1;
            task.remaining_burst -= 1;

            if task.remaining_burst > 0 && self.queue.has_preempting_peer(task.remaining_burst) {
                task.round += 1;
                return ExecOutcome::Preempted;
            }
        }

        task.round += 1;
        if task.remaining_burst <= 0 {
            ExecOutcome::Completed
        } else {
            ExecOutcome::Yielded
        }
    }
}
