//! Minimal HTTP/1.1 server for integration tests.
//!
//! Answers every request with a scripted status line and body. The script is
//! a list of responses; request N gets entry N, and the last entry repeats
//! once the script runs out. A shared counter records how many requests
//! were served.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

pub struct StatusServer {
    pub url: String,
    pub hits: Arc<AtomicUsize>,
}

/// Starts a server in a background thread. Runs until the process exits.
pub fn start(script: Vec<Reply>) -> StatusServer {
    assert!(!script.is_empty(), "script needs at least one reply");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let script = Arc::new(script);
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let reply = script[n.min(script.len() - 1)].clone();
            thread::spawn(move || handle(stream, &reply));
        }
    });
    StatusServer {
        url: format!("http://127.0.0.1:{}/healthz", port),
        hits,
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn handle(mut stream: std::net::TcpStream, reply: &Reply) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reason(reply.status),
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(response.as_bytes());
}
