//! In-memory transport and sleeper doubles for unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crate::client::Sleeper;
use crate::retry::TransportError;
use crate::transport::{HttpResponse, Transport};

pub(crate) type Reply = Result<HttpResponse, TransportError>;

pub(crate) fn status(code: u16) -> Reply {
    Ok(HttpResponse::new(code, format!("{{\"status\":{code}}}")))
}

pub(crate) fn refused() -> Reply {
    Err(TransportError::connection("Couldn't connect to server"))
}

/// Request seen by the scripted transport: method, URL, record code for POSTs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Seen {
    pub method: &'static str,
    pub url: String,
    pub code: Option<String>,
}

/// Replies per record code, popped in order; the last reply of a script repeats.
/// Codes without a script get `default`.
pub(crate) struct ScriptedTransport {
    health: Reply,
    scripts: HashMap<String, VecDeque<Reply>>,
    default: Reply,
    seen: Rc<RefCell<Vec<Seen>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            health: status(200),
            scripts: HashMap::new(),
            default: status(201),
            seen: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn health(mut self, reply: Reply) -> Self {
        self.health = reply;
        self
    }

    pub fn script(mut self, code: &str, replies: Vec<Reply>) -> Self {
        self.scripts.insert(code.to_string(), replies.into());
        self
    }

    pub fn seen(&self) -> Rc<RefCell<Vec<Seen>>> {
        Rc::clone(&self.seen)
    }
}

impl Transport for ScriptedTransport {
    fn post_json(&mut self, url: &str, body: &[u8], _timeout: Duration) -> Reply {
        let code = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v["code"].as_str().map(str::to_string));
        self.seen.borrow_mut().push(Seen {
            method: "POST",
            url: url.to_string(),
            code: code.clone(),
        });
        match code.as_deref().and_then(|c| self.scripts.get_mut(c)) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(|| status(500)),
            Some(queue) => queue.front().cloned().unwrap_or_else(|| status(500)),
            None => self.default.clone(),
        }
    }

    fn get(&mut self, url: &str, _timeout: Duration) -> Reply {
        self.seen.borrow_mut().push(Seen {
            method: "GET",
            url: url.to_string(),
            code: None,
        });
        self.health.clone()
    }
}

/// Records requested sleeps instead of blocking.
#[derive(Default, Clone)]
pub(crate) struct RecordingSleeper {
    slept: Rc<RefCell<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}
