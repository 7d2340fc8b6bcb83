#![allow(dead_code)]

use std::io::prelude::*;
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

// a tiny http service for the client to talk to, one connection at a time

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
    pub delay: Option<Duration>,
    // announced length when it differs from the body, the connection closes early
    pub claimed_len: Option<usize>,
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string().into_bytes(),
            delay: None,
            claimed_len: None,
        }
    }

    pub fn raw(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            body: body.to_vec(),
            delay: None,
            claimed_len: None,
        }
    }

    /// Announces `claimed_len` bytes but sends only `body` before closing.
    pub fn cut_short(status: u16, body: &[u8], claimed_len: usize) -> Self {
        Self {
            claimed_len: Some(claimed_len),
            ..Self::raw(status, body)
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

pub struct StubService {
    pub base_url: String,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl StubService {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&Recorded) -> Reply + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let recorded = Arc::new(Mutex::new(vec![]));

        let log = Arc::clone(&recorded);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let stream = match stream {
                    Ok(stream) => stream,
                    Err(_) => continue,
                };
                handle_connection(stream, &handler, &log);
            }
        });

        Self { base_url, recorded }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }
}

/// An address nothing listens on.
pub fn closed_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn handle_connection<F>(mut stream: TcpStream, handler: &F, log: &Arc<Mutex<Vec<Recorded>>>)
where
    F: Fn(&Recorded) -> Reply,
{
    let mut buffer = vec![];
    let mut chunk = [0; 2048];

    // read until the headers are complete
    let (method, path, header_len, content_length) = loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buffer.extend_from_slice(&chunk[..n]);

        let mut headers = [httparse::EMPTY_HEADER; 32];
        let mut req = httparse::Request::new(&mut headers);
        if let Ok(httparse::Status::Complete(header_len)) = req.parse(&buffer) {
            let content_length = req
                .headers
                .iter()
                .find(|h| h.name.eq_ignore_ascii_case("content-length"))
                .and_then(|h| std::str::from_utf8(h.value).ok())
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            break (
                req.method.unwrap_or_default().to_string(),
                req.path.unwrap_or_default().to_string(),
                header_len,
                content_length,
            );
        }
    };

    // then the body
    while buffer.len() < header_len + content_length {
        let n = match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buffer.extend_from_slice(&chunk[..n]);
    }

    let end = buffer.len().min(header_len + content_length);
    let recorded = Recorded {
        method,
        path,
        body: buffer[header_len..end].to_vec(),
    };
    log.lock().unwrap().push(recorded.clone());

    let reply = handler(&recorded);
    if let Some(delay) = reply.delay {
        thread::sleep(delay);
    }

    let head = format!(
        "HTTP/1.1 {} Stub\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n",
        reply.status,
        reply.claimed_len.unwrap_or(reply.body.len())
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&reply.body);
    let _ = stream.flush();
}
