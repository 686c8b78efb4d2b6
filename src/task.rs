use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::classify;
use crate::sink::OutputSink;

pub type TaskId = u32;

/// Burst sentinel for shell tasks. Orders below every program remaining,
/// which is what gives shells priority in the SRTF comparison.
pub const SHELL_BURST: i32 = -1;
/// Burst assumed for a program when no duration argument is given.
pub const DEFAULT_BURST: i32 = 10;
/// Cap on captured shell output, per task.
pub const OUTPUT_BUFFER_LIMIT: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Immediately-executed command; runs to completion in one round.
    Shell,
    /// Simulated compute task; runs in quanta with preemption polls.
    Program,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Created,
    Waiting,
    Running,
    Ended,
}

/// One unit of scheduling: immutable identity plus mutable progress.
///
/// Owned by the queue while queued, by the executor while running.
/// `id` is the originating client number, so every task a client submits
/// shares its id.
pub struct Task {
    pub(crate) id: TaskId,
    pub(crate) client: u32,
    pub(crate) command: String,
    pub(crate) kind: TaskKind,
    pub(crate) total_burst: i32,
    pub(crate) remaining_burst: i32,
    pub(crate) current_iteration: i32,
    pub(crate) round: u32,
    pub(crate) state: TaskState,
    pub(crate) arrival: Instant,
    pub(crate) started_at: Option<Instant>,
    pub(crate) ended_at: Option<Instant>,
    /// Captured child output; shell tasks only.
    pub(crate) output: Vec<u8>,
    pub(crate) sink: Arc<dyn OutputSink>,
}

impl Task {
    /// Classifies `command` and builds the task record for `client`.
    ///
    /// Programs get their burst extracted from the command (default 10);
    /// shells get the `-1` sentinel in both burst fields.
    pub fn new(command: &str, client: u32, sink: Arc<dyn OutputSink>) -> Self {
        let kind = classify::kind_of(command);
        let burst = match kind {
            TaskKind::Shell => SHELL_BURST,
            TaskKind::Program => classify::burst_of(command),
        };
        Self {
            id: client,
            client,
            command: command.to_string(),
            kind,
            total_burst: burst,
            remaining_burst: burst,
            current_iteration: 0,
            round: 0,
            state: TaskState::Created,
            arrival: Instant::now(),
            started_at: None,
            ended_at: None,
            output: Vec::new(),
            sink,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn client(&self) -> u32 {
        self.client
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn total_burst(&self) -> i32 {
        self.total_burst
    }

    pub fn remaining_burst(&self) -> i32 {
        self.remaining_burst
    }

    pub fn current_iteration(&self) -> i32 {
        self.current_iteration
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn arrival(&self) -> Instant {
        self.arrival
    }

    pub fn is_shell(&self) -> bool {
        self.remaining_burst == SHELL_BURST
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("client", &self.client)
            .field("command", &self.command)
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("remaining_burst", &self.remaining_burst)
            .field("round", &self.round)
            .finish()
    }
}
