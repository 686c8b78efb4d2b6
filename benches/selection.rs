//! Selection-policy micro-benchmark.
//!
//! Run with: cargo bench --bench selection
//!
//! Measures a single `select` call over randomized queues of mixed shell
//! and program tasks, for each policy and queue size. Selection runs with
//! the queue lock held, so its cost bounds how often the preemption poll
//! and the worker can cycle.

use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use timeslice::{Fcfs, HybridSrtf, MemorySink, SelectPolicy, Task};

const QUEUE_SIZES: &[usize] = &[10, 50, 100];
const WARMUP_ITERS: usize = 10_000;
const BENCH_ITERS: usize = 200_000;

fn build_queue(size: usize) -> Vec<Task> {
    let mut rng = rand::thread_rng();
    (0..size)
        .map(|i| {
            let client = (i % 10 + 1) as u32;
            let command = if rng.gen_bool(0.2) {
                "pwd".to_string()
            } else {
                format!("./demo {}", rng.gen_range(1..=30))
            };
            Task::new(&command, client, Arc::new(MemorySink::new()))
        })
        .collect()
}

fn bench_policy(name: &str, policy: &dyn SelectPolicy) {
    for &size in QUEUE_SIZES {
        let tasks = build_queue(size);

        for i in 0..WARMUP_ITERS {
            let last = Some((i % 10 + 1) as u32);
            std::hint::black_box(policy.select(&tasks, last));
        }

        let start = Instant::now();
        for i in 0..BENCH_ITERS {
            let last = Some((i % 10 + 1) as u32);
            std::hint::black_box(policy.select(&tasks, last));
        }
        let elapsed = start.elapsed();

        println!(
            "{name:8} size={size:3}  {:>8.1} ns/select",
            elapsed.as_nanos() as f64 / BENCH_ITERS as f64
        );
    }
}

fn main() {
    bench_policy("hybrid", &HybridSrtf);
    bench_policy("fcfs", &Fcfs);
}
