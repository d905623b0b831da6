//! Minimal HTTP/1.1 server standing in for the Wayback APIs in integration tests.
//!
//! Each route matches a method and path prefix and answers from a list of
//! scripted replies; the last reply repeats once the list runs out. Every
//! request is recorded so tests can inspect what the client sent.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u32,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Reply {
    pub fn json(status: u32, body: &str) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: 302,
            headers: vec![("Location".to_string(), location.to_string())],
            body: String::new(),
        }
    }
}

struct Route {
    method: &'static str,
    prefix: &'static str,
    replies: VecDeque<Reply>,
}

/// A request as the server saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Seen {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
pub struct ServerBuilder {
    routes: Vec<Route>,
}

impl ServerBuilder {
    pub fn route(mut self, method: &'static str, prefix: &'static str, replies: Vec<Reply>) -> Self {
        self.routes.push(Route {
            method,
            prefix,
            replies: replies.into(),
        });
        self
    }

    /// Starts the server in a background thread. Returns the base URL
    /// (e.g. "http://127.0.0.1:12345") and the request log.
    pub fn start(self) -> (String, Arc<Mutex<Vec<Seen>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes = Arc::new(Mutex::new(self.routes));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                handle(stream, &routes, &log);
            }
        });
        (format!("http://127.0.0.1:{}", port), seen)
    }
}

fn handle(mut stream: TcpStream, routes: &Mutex<Vec<Route>>, log: &Mutex<Vec<Seen>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let seen = match read_request(&mut stream) {
        Some(s) => s,
        None => return,
    };

    let reply = {
        let mut routes = routes.lock().unwrap();
        routes
            .iter_mut()
            .find(|r| r.method == seen.method && seen.target.starts_with(r.prefix))
            .map(|r| {
                if r.replies.len() > 1 {
                    r.replies.pop_front().unwrap()
                } else {
                    r.replies.front().cloned().unwrap()
                }
            })
            .unwrap_or_else(|| Reply::json(404, "{}"))
    };
    log.lock().unwrap().push(seen);

    let mut head = format!(
        "HTTP/1.1 {} Scripted\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reply.body.len()
    );
    for (k, v) in &reply.headers {
        head.push_str(&format!("{}: {}\r\n", k, v));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(reply.body.as_bytes());
}

fn read_request(stream: &mut TcpStream) -> Option<Seen> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).into_owned();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while data.len() < header_end + content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    let end = data.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&data[header_end..end]).into_owned();

    Some(Seen {
        method,
        target,
        headers,
        body,
    })
}
