use std::io::{self, BufRead, BufReader};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;

use crate::logging::StateLog;
use crate::scheduler::Scheduler;
use crate::sink::OutputSink;

/// TCP front end: accepts clients, assigns them sequential numbers, and
/// runs one handler thread per connection. Handlers read one command per
/// line and hand it to the scheduler; the scheduler streams output back
/// through the client's socket.
pub struct Server {
    listener: TcpListener,
    scheduler: Arc<Scheduler>,
    log: Arc<StateLog>,
    next_client: AtomicU32,
}

impl Server {
    pub fn bind(addr: impl ToSocketAddrs, scheduler: Arc<Scheduler>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        let log = scheduler.log();
        Ok(Self {
            listener,
            scheduler,
            log,
            next_client: AtomicU32::new(0),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop; runs until the listener fails fatally.
    pub fn serve(&self) -> io::Result<()> {
        tracing::info!(addr = %self.listener.local_addr()?, "listening");
        for conn in self.listener.incoming() {
            let stream = match conn {
                Ok(stream) => stream,
                Err(err) => {
                    tracing::warn!(%err, "accept failed");
                    continue;
                }
            };
            let client = self.next_client.fetch_add(1, Ordering::Relaxed) + 1;
            self.log.connected(client);

            let scheduler = Arc::clone(&self.scheduler);
            let log = Arc::clone(&self.log);
            let spawned = thread::Builder::new()
                .name(format!("client-{client}"))
                .spawn(move || handle_client(stream, client, scheduler, log));
            if let Err(err) = spawned {
                tracing::warn!(client, %err, "failed to spawn client handler");
            }
        }
        Ok(())
    }
}

/// Per-client receive loop: one command per line, `exit` closes the
/// connection, everything else goes to the scheduler. On disconnect the
/// client's queued tasks are purged.
fn handle_client(stream: TcpStream, client: u32, scheduler: Arc<Scheduler>, log: Arc<StateLog>) {
    let peer = stream.peer_addr().ok();
    tracing::info!(client, ?peer, "client connected");

    let sink: Arc<TcpStream> = match stream.try_clone() {
        Ok(writer) => Arc::new(writer),
        Err(err) => {
            tracing::warn!(client, %err, "failed to clone client stream");
            return;
        }
    };

    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let Ok(line) = line else { break };
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if command == "exit" {
            let _ = sink.send(b"Disconnected from server.\n");
            break;
        }

        log.received(client, command);
        if let Err(err) = scheduler.submit(command, client, Arc::clone(&sink) as _) {
            tracing::warn!(client, %err, "command rejected");
            // surface the rejection on the client channel and drop the task
            let _ = sink.send(format!("Server error: {err}\n").as_bytes());
        }
    }

    scheduler.remove_client(client);
    tracing::info!(client, "client disconnected");
}
