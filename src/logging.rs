//! The specified stdout surface: colour-tagged task state transitions,
//! client side-channel lines, and the schedule-summary drain.
//!
//! These formats are part of the external contract (tests match on them),
//! so they bypass `tracing` and go straight to stdout, serialized by one
//! process-wide logging mutex. Diagnostics that are not part of the
//! contract use `tracing` instead.

use std::sync::Mutex;

const COLOR_CREATED: &str = "\x1b[1;36m"; // bold cyan
const COLOR_STARTED: &str = "\x1b[1;32m"; // bold green
const COLOR_WAITING: &str = "\x1b[1;33m"; // bold yellow
const COLOR_RUNNING: &str = "\x1b[1;35m"; // bold magenta
const COLOR_ENDED: &str = "\x1b[1;31m"; // bold red
const COLOR_SUMMARY: &str = "\x1b[1;37;46m"; // white on cyan highlight
const COLOR_RESET: &str = "\x1b[0m";

/// Task lifecycle transitions as they appear in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Created,
    Started,
    Waiting,
    Running,
    Ended,
}

impl Transition {
    fn label(self) -> &'static str {
        match self {
            Transition::Created => "created",
            Transition::Started => "started",
            Transition::Waiting => "waiting",
            Transition::Running => "running",
            Transition::Ended => "ended",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Transition::Created => COLOR_CREATED,
            Transition::Started => COLOR_STARTED,
            Transition::Waiting => COLOR_WAITING,
            Transition::Running => COLOR_RUNNING,
            Transition::Ended => COLOR_ENDED,
        }
    }
}

/// Serializes all contract-format writes to stdout.
pub struct StateLog {
    lock: Mutex<()>,
}

impl StateLog {
    pub fn new() -> Self {
        Self {
            lock: Mutex::new(()),
        }
    }

    // Logging must survive a panicked holder, so poison is ignored.
    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// `[{client}]--- {state} ({remaining})`, colour escapes around the
    /// state word only. `remaining` is `-1` for shell tasks.
    pub fn transition(&self, client: u32, transition: Transition, remaining: i32) {
        let line = format_transition(client, transition, remaining);
        let _g = self.guard();
        println!("{line}");
    }

    pub fn connected(&self, client: u32) {
        let _g = self.guard();
        println!("[{client}]<<< client connected");
    }

    pub fn received(&self, client: u32, command: &str) {
        let _g = self.guard();
        println!("[{client}]>>> {command}");
    }

    pub fn bytes_sent(&self, client: u32, bytes: usize) {
        let _g = self.guard();
        println!("[{client}]<<< {bytes} bytes sent");
    }

    /// Blank line, then the drained summary in the highlight colour.
    pub fn summary(&self, line: &str) {
        let _g = self.guard();
        print!("\n{COLOR_SUMMARY}{line}{COLOR_RESET}\n");
    }
}

impl Default for StateLog {
    fn default() -> Self {
        Self::new()
    }
}

fn format_transition(client: u32, transition: Transition, remaining: i32) -> String {
    format!(
        "[{client}]--- {}{}{} ({remaining})",
        transition.color(),
        transition.label(),
        COLOR_RESET
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_format_matches_contract() {
        assert_eq!(
            format_transition(1, Transition::Created, -1),
            "[1]--- \x1b[1;36mcreated\x1b[0m (-1)"
        );
        assert_eq!(
            format_transition(7, Transition::Running, 4),
            "[7]--- \x1b[1;35mrunning\x1b[0m (4)"
        );
        assert_eq!(
            format_transition(2, Transition::Ended, 0),
            "[2]--- \x1b[1;31mended\x1b[0m (0)"
        );
    }

    #[test]
    fn every_transition_has_a_distinct_color() {
        let transitions = [
            Transition::Created,
            Transition::Started,
            Transition::Waiting,
            Transition::Running,
            Transition::Ended,
        ];
        for (i, a) in transitions.iter().enumerate() {
            for b in &transitions[i + 1..] {
                assert_ne!(a.color(), b.color());
            }
        }
    }
}
