use std::io;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use timeslice::{Fcfs, HybridSrtf, Scheduler, SelectPolicy, Server};

/// Remote command execution server with a preemptive task scheduler.
///
/// Clients connect over TCP and send one command per line. Shell commands
/// run to completion immediately; `./demo N` style programs are scheduled
/// in quanta and stream their progress back tick by tick.
#[derive(Parser, Debug)]
#[command(name = "timesliced", version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Task selection policy
    #[arg(long, value_enum, default_value_t = PolicyArg::Hybrid)]
    policy: PolicyArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    /// Shell priority + shortest remaining time, no consecutive selection
    Hybrid,
    /// Plain first-come-first-served
    Fcfs,
}

impl PolicyArg {
    fn build(self) -> Box<dyn SelectPolicy> {
        match self {
            PolicyArg::Hybrid => Box::new(HybridSrtf),
            PolicyArg::Fcfs => Box::new(Fcfs),
        }
    }
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let args = Args::parse();

    let mut scheduler = Scheduler::new(args.policy.build());
    scheduler.start();

    let server = Server::bind((args.host.as_str(), args.port), Arc::new(scheduler))?;
    server.serve()
}
