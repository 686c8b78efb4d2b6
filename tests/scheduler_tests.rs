//! End-to-end scheduling scenarios driven through the public API, with a
//! millisecond tick and in-memory sinks standing in for client sockets.
//! Assertions target ordering and content, not wall-clock counts.

use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use timeslice::{HybridSrtf, MemorySink, OutputSink, Scheduler, SchedulerError, MAX_TASKS};

const TICK: Duration = Duration::from_millis(20);

fn started_scheduler() -> Scheduler {
    let mut scheduler = Scheduler::with_tick(Box::new(HybridSrtf), TICK);
    scheduler.start();
    scheduler
}

fn wait_until(mut cond: impl FnMut() -> bool, what: &str) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(5));
    }
}

/// Shared chronological record of every send, tagged with the client that
/// owns the sink. Event order is delivery order.
#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<(u32, String)>>,
}

impl EventLog {
    fn events(&self) -> Vec<(u32, String)> {
        self.events.lock().unwrap().clone()
    }

    fn count_for(&self, client: u32) -> usize {
        self.events().iter().filter(|(c, _)| *c == client).count()
    }

    fn lines_of(&self, client: u32) -> Vec<String> {
        self.events()
            .iter()
            .filter(|(c, _)| *c == client)
            .map(|(_, line)| line.clone())
            .collect()
    }

    fn last_index_of(&self, client: u32) -> Option<usize> {
        self.events().iter().rposition(|(c, _)| *c == client)
    }

    fn sink(self: &Arc<Self>, client: u32) -> Arc<EventSink> {
        Arc::new(EventSink {
            client,
            log: Arc::clone(self),
        })
    }
}

struct EventSink {
    client: u32,
    log: Arc<EventLog>,
}

impl OutputSink for EventSink {
    fn send(&self, bytes: &[u8]) -> io::Result<()> {
        self.log
            .events
            .lock()
            .unwrap()
            .push((self.client, String::from_utf8_lossy(bytes).into_owned()));
        Ok(())
    }
}

/// Simulates a client whose socket is gone: every send fails.
struct FailingSink;

impl OutputSink for FailingSink {
    fn send(&self, _bytes: &[u8]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "client gone"))
    }
}

#[test]
fn single_shell_task_delivers_captured_output() {
    let scheduler = started_scheduler();
    let sink = Arc::new(MemorySink::new());

    scheduler
        .submit("echo hello", 1, Arc::clone(&sink) as _)
        .unwrap();
    wait_until(|| sink.text() == "hello\n", "shell output");
}

#[test]
fn single_program_streams_to_completion() {
    let scheduler = started_scheduler();
    let sink = Arc::new(MemorySink::new());

    scheduler
        .submit("./demo 3", 5, Arc::clone(&sink) as _)
        .unwrap();
    wait_until(
        || sink.text() == "Demo 1/3\nDemo 2/3\nDemo 3/3\n",
        "three progress lines",
    );
    // one send per simulated second, not one batched write
    wait_until(|| sink.send_count() == 3, "three sends");
}

#[test]
fn shorter_program_preempts_and_finishes_first() {
    let scheduler = started_scheduler();
    let log = Arc::new(EventLog::default());

    scheduler
        .submit("./demo 10", 6, log.sink(6) as _)
        .unwrap();
    wait_until(|| log.count_for(6) >= 1, "first tick of the long program");
    thread::sleep(TICK * 3 / 2);

    scheduler.submit("./demo 4", 7, log.sink(7) as _).unwrap();
    wait_until(
        || log.count_for(6) == 10 && log.count_for(7) == 4,
        "both programs to finish",
    );

    // the short program overtook the long one
    assert!(log.last_index_of(7).unwrap() < log.last_index_of(6).unwrap());

    // each task's own stream stays in iteration order regardless of the
    // interleaving
    let expected: Vec<String> = (1..=10).map(|i| format!("Demo {i}/10\n")).collect();
    assert_eq!(log.lines_of(6), expected);
    let expected: Vec<String> = (1..=4).map(|i| format!("Demo {i}/4\n")).collect();
    assert_eq!(log.lines_of(7), expected);
}

#[test]
fn shell_command_preempts_running_program() {
    let scheduler = started_scheduler();
    let log = Arc::new(EventLog::default());

    scheduler
        .submit("./demo 20", 8, log.sink(8) as _)
        .unwrap();
    wait_until(|| log.count_for(8) >= 1, "program to start");
    thread::sleep(TICK);

    scheduler.submit("pwd", 9, log.sink(9) as _).unwrap();
    wait_until(
        || log.count_for(8) == 20 && log.count_for(9) >= 1,
        "program completion and shell output",
    );

    // the shell ran before the program was done
    assert!(log.last_index_of(9).unwrap() < log.last_index_of(8).unwrap());
}

#[test]
fn equal_bursts_alternate_between_clients() {
    let mut scheduler = Scheduler::with_tick(Box::new(HybridSrtf), TICK);
    let log = Arc::new(EventLog::default());

    // both queued before the worker starts, so the schedule is fixed:
    // 1 runs its first quantum (3), 2 runs one tick and is preempted by
    // 1's shorter remainder, 1 finishes, 2 finishes alone
    scheduler.submit("./demo 4", 1, log.sink(1) as _).unwrap();
    scheduler.submit("./demo 4", 2, log.sink(2) as _).unwrap();
    scheduler.start();

    wait_until(
        || log.count_for(1) == 4 && log.count_for(2) == 4,
        "both programs to finish",
    );
    let sequence: Vec<u32> = log.events().iter().map(|(c, _)| *c).collect();
    assert_eq!(sequence, vec![1, 1, 1, 2, 1, 2, 2, 2]);
}

#[test]
fn disconnected_client_does_not_stall_the_scheduler() {
    let scheduler = started_scheduler();

    scheduler
        .submit("./demo 6", 3, Arc::new(FailingSink) as _)
        .unwrap();
    thread::sleep(TICK * 2);
    // the client is gone: purge its queued work (none; it is running) and
    // let the running task finish its course with failing sends
    scheduler.remove_client(3);

    wait_until(|| scheduler.is_idle(), "scheduler to go idle");
    assert_eq!(scheduler.queued(), 0);

    // a later task is unaffected
    let sink = Arc::new(MemorySink::new());
    scheduler.submit("echo next", 4, Arc::clone(&sink) as _).unwrap();
    wait_until(|| sink.text() == "next\n", "next client output");
}

#[test]
fn remove_client_purges_only_that_clients_queue_entries() {
    // no worker: inspect the queue directly
    let scheduler = Scheduler::with_tick(Box::new(HybridSrtf), TICK);

    scheduler
        .submit("./demo 5", 1, Arc::new(MemorySink::new()) as _)
        .unwrap();
    scheduler
        .submit("./demo 5", 2, Arc::new(MemorySink::new()) as _)
        .unwrap();
    scheduler
        .submit("ls", 1, Arc::new(MemorySink::new()) as _)
        .unwrap();
    assert_eq!(scheduler.queued(), 3);

    scheduler.remove_client(1);
    assert_eq!(scheduler.queued(), 1);

    let survivor = scheduler.remove_task(2).unwrap();
    assert_eq!(survivor.client(), 2);
}

#[test]
fn queue_full_is_surfaced_to_the_submitter() {
    let scheduler = Scheduler::with_tick(Box::new(HybridSrtf), TICK);

    for client in 1..=MAX_TASKS as u32 {
        scheduler
            .submit("./demo 5", client, Arc::new(MemorySink::new()) as _)
            .unwrap();
    }
    let err = scheduler
        .submit("./demo 5", 999, Arc::new(MemorySink::new()) as _)
        .unwrap_err();
    assert!(matches!(err, SchedulerError::QueueFull { .. }));
}

#[test]
fn stop_cuts_a_running_program_at_its_quantum() {
    let mut scheduler = started_scheduler();
    let log = Arc::new(EventLog::default());

    scheduler.submit("./demo 50", 2, log.sink(2) as _).unwrap();
    wait_until(|| log.count_for(2) >= 1, "program to start");

    scheduler.stop();
    let after_stop = log.count_for(2);
    // the running task finished its current quantum, nothing more
    assert!(after_stop <= 3, "ran {after_stop} ticks past stop");

    thread::sleep(TICK * 3);
    assert_eq!(log.count_for(2), after_stop);
    // stop drained whatever the summary held
    assert!(scheduler.summary_entries().is_empty());
}
