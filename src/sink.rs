use std::io::{self, Write};
use std::net::TcpStream;
use std::sync::Mutex;

/// Client-owned output channel that the executor writes task output to.
///
/// The scheduler only ever borrows a sink (via `Arc`); it never closes one.
/// A failed send means the client is gone — callers ignore the error and the
/// per-client cleanup purges whatever work remains.
pub trait OutputSink: Send + Sync {
    fn send(&self, bytes: &[u8]) -> io::Result<()>;
}

impl OutputSink for TcpStream {
    fn send(&self, bytes: &[u8]) -> io::Result<()> {
        let mut stream = self;
        stream.write_all(bytes)
    }
}

/// In-memory sink that records every send, for tests and offline capture.
#[derive(Debug, Default)]
pub struct MemorySink {
    chunks: Mutex<Vec<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All bytes sent so far, concatenated.
    pub fn contents(&self) -> Vec<u8> {
        self.chunks
            .lock()
            .expect("memory sink mutex poisoned")
            .concat()
    }

    /// Contents as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    /// Number of individual `send` calls observed.
    pub fn send_count(&self) -> usize {
        self.chunks.lock().expect("memory sink mutex poisoned").len()
    }
}

impl OutputSink for MemorySink {
    fn send(&self, bytes: &[u8]) -> io::Result<()> {
        self.chunks
            .lock()
            .expect("memory sink mutex poisoned")
            .push(bytes.to_vec());
        Ok(())
    }
}
