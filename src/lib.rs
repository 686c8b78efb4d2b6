mod classify;
mod error;
mod executor;
mod logging;
mod policy;
mod queue;
mod scheduler;
mod server;
mod sink;
mod summary;
mod task;

pub use error::SchedulerError;
pub use executor::{DEFAULT_QUANTUM, FIRST_ROUND_QUANTUM};
pub use logging::{StateLog, Transition};
pub use policy::{Fcfs, HybridSrtf, SelectPolicy};
pub use queue::{WaitingQueue, MAX_TASKS};
pub use scheduler::Scheduler;
pub use server::Server;
pub use sink::{MemorySink, OutputSink};
pub use summary::{ScheduleSummary, SummaryEntry, SUMMARY_CAPACITY};
pub use task::{Task, TaskId, TaskKind, TaskState, DEFAULT_BURST, OUTPUT_BUFFER_LIMIT, SHELL_BURST};
