use std::io::{self, BufRead, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::thread;

use clap::Parser;

/// Interactive client for the timeslice server.
///
/// Commands typed on stdin go to the server one line at a time; everything
/// the server sends back (shell output, streamed program progress) is
/// printed as it arrives.
#[derive(Parser, Debug)]
#[command(name = "tsh", version, about)]
struct Args {
    /// Server host to connect to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to connect to
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);
    let stream = TcpStream::connect(&addr)?;
    println!("Connected to server {addr}");

    // server output arrives over many sends while a program runs, so a
    // dedicated reader streams it instead of one recv per command
    let mut reader = stream.try_clone()?;
    let printer = thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match reader.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let mut out = io::stdout().lock();
                    let _ = out.write_all(&buf[..n]);
                    let _ = out.flush();
                }
            }
        }
        println!("Server disconnected.");
    });

    let mut sent_exit = false;
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        (&stream).write_all(command.as_bytes())?;
        (&stream).write_all(b"\n")?;
        if command == "exit" {
            sent_exit = true;
            break;
        }
    }

    // Ctrl+D behaves like a typed exit
    if !sent_exit {
        let _ = (&stream).write_all(b"exit\n");
    }
    let _ = stream.shutdown(Shutdown::Write);
    let _ = printer.join();
    Ok(())
}
