//! Minimal HTTP/1.1 server for integration tests of the delivery path.
//!
//! Serves `GET /health` with a fixed status and `POST /produtos` from a
//! per-record-code script of replies. A script's last reply repeats; codes
//! without a script get 201 with the record echoed back. Every connection is
//! closed after one response.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// Respond with this status and a small JSON body.
    Status(u16),
    /// Hold the connection without answering, then close it.
    Stall(Duration),
}

/// A request the server received.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub code: Option<String>,
}

#[derive(Default)]
struct State {
    health: u16,
    scripts: HashMap<String, VecDeque<Reply>>,
    hits: Vec<Hit>,
    next_id: u64,
}

pub struct ScriptedServer {
    pub base_url: String,
    state: Arc<Mutex<State>>,
}

impl ScriptedServer {
    /// Starts a server in a background thread. It runs until the process exits.
    pub fn start(health: u16, scripts: &[(&str, Vec<Reply>)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State {
            health,
            scripts: scripts
                .iter()
                .map(|(code, replies)| (code.to_string(), replies.iter().copied().collect()))
                .collect(),
            ..State::default()
        }));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.state.lock().unwrap().hits.clone()
    }

    pub fn posts(&self) -> Vec<String> {
        self.hits()
            .into_iter()
            .filter(|h| h.method == "POST")
            .filter_map(|h| h.code)
            .collect()
    }
}

/// A base URL nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some((method, path, body)) = read_request(&mut stream) else {
        return;
    };
    let code = serde_json::from_slice::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["code"].as_str().map(str::to_string));

    let reply = {
        let mut st = state.lock().unwrap();
        st.hits.push(Hit {
            method: method.clone(),
            path: path.clone(),
            code: code.clone(),
        });
        match (method.as_str(), path.as_str()) {
            ("GET", "/health") => Reply::Status(st.health),
            ("POST", "/produtos") => {
                let scripted = code.as_deref().and_then(|c| st.scripts.get_mut(c)).map(|q| {
                    if q.len() > 1 {
                        q.pop_front().unwrap_or(Reply::Status(500))
                    } else {
                        q.front().copied().unwrap_or(Reply::Status(500))
                    }
                });
                scripted.unwrap_or(Reply::Status(201))
            }
            _ => Reply::Status(404),
        }
    };

    match reply {
        Reply::Stall(d) => thread::sleep(d),
        Reply::Status(status) => {
            let payload = if status == 201 || status == 200 {
                let mut st = state.lock().unwrap();
                st.next_id += 1;
                let mut record = serde_json::from_slice::<serde_json::Value>(&body)
                    .unwrap_or(serde_json::Value::Null);
                if let Some(obj) = record.as_object_mut() {
                    obj.insert("id".into(), st.next_id.into());
                }
                serde_json::json!({ "status": "ok", "produto": record }).to_string()
            } else if status == 400 {
                serde_json::json!({ "error": "missing required field" }).to_string()
            } else {
                serde_json::json!({ "error": "simulated failure", "code": status }).to_string()
            };
            let response = format!(
                "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                payload.len(),
                payload
            );
            let _ = stream.write_all(response.as_bytes());
        }
    }
}

/// Returns (method, path, body), reading the body per `Content-Length`.
fn read_request(stream: &mut TcpStream) -> Option<(String, String, Vec<u8>)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = std::str::from_utf8(&buf[..header_end]).ok()?.to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);
    Some((method, path, body))
}
