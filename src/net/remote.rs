//! src/net/remote.rs
//!
//! Tiny line-based TCP control server. Client threads never touch the
//! engine: each parsed command is queued for the terminal thread together
//! with a channel for its reply.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::mpsc::{Sender, channel};
use std::thread;
use std::time::Duration;

use super::command::Command;

/// How long a client waits for the terminal thread to answer.
const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// A command waiting to be applied, plus where to send the reply line.
pub struct Request {
    pub command: Command,
    pub reply: Sender<String>,
}

/// Bind `addr` and serve clients until the listener fails.
pub fn remote_server(addr: &str, queue: Sender<Request>) -> io::Result<()> {
    let listener = TcpListener::bind(addr)?;
    tracing::info!(%addr, "remote control listening");
    serve(listener, queue);
    Ok(())
}

/// Accept loop: one handler thread per client.
pub fn serve(listener: TcpListener, queue: Sender<Request>) {
    for stream in listener.incoming() {
        match stream {
            Ok(s) => {
                let q = queue.clone();
                thread::spawn(move || handle_remote_client(s, q));
            }
            Err(e) => {
                tracing::warn!(error = %e, "remote accept error");
            }
        }
    }
}

/// Handle a single client; whitespace-split ASCII commands, one reply line
/// per command.
pub fn handle_remote_client(mut s: TcpStream, queue: Sender<Request>) {
    let peer = s
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "<peer?>".into());
    let rdr = match s.try_clone() {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(%peer, error = %e, "cannot clone client stream");
            return;
        }
    };
    let mut rdr = BufReader::new(rdr);
    let mut line = String::new();
    tracing::debug!(%peer, "remote client connected");

    loop {
        line.clear();
        match rdr.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }

        let reply = match raw.parse::<Command>() {
            Err(e) => format!("ERR {e}"),
            Ok(Command::Quit) => {
                let _ = s.write_all(b"OK bye\n");
                break;
            }
            Ok(command) => {
                let (tx, rx) = channel();
                if queue.send(Request { command, reply: tx }).is_err() {
                    let _ = s.write_all(b"ERR shutting_down\n");
                    break;
                }
                rx.recv_timeout(REPLY_TIMEOUT)
                    .unwrap_or_else(|_| "ERR timeout".to_string())
            }
        };
        tracing::debug!(%peer, command = raw, %reply, "remote command");
        if s.write_all(format!("{reply}\n").as_bytes()).is_err() {
            break;
        }
    }

    tracing::debug!(%peer, "remote client disconnected");
    let _ = s.shutdown(Shutdown::Both);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_queued_and_replies_returned() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let (tx, rx) = channel::<Request>();
        thread::spawn(move || serve(listener, tx));

        // stand-in for the terminal thread
        thread::spawn(move || {
            for req in rx {
                let reply = match req.command {
                    Command::Status => "OK phase=hidden".to_string(),
                    other => format!("OK {other:?}"),
                };
                let _ = req.reply.send(reply);
            }
        });

        let mut client = TcpStream::connect(addr).expect("connect");
        client
            .write_all(b"status\n\nbogus\nreset\nquit\n")
            .expect("write");
        let lines: Vec<String> = BufReader::new(client)
            .lines()
            .map_while(|l| l.ok())
            .collect();
        assert_eq!(
            lines,
            ["OK phase=hidden", "ERR unknown bogus", "OK Reset", "OK bye"]
        );
    }
}
