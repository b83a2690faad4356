//! Per-attempt and per-record delivery outcomes.

use serde::Serialize;
use std::fmt;

use crate::retry::{Signal, TransportError, TransportKind};

/// Body of a successful response: JSON when it parses, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Json(serde_json::Value),
    Text(String),
}

impl ResponsePayload {
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(v) => ResponsePayload::Json(v),
            Err(_) => ResponsePayload::Text(String::from_utf8_lossy(body).into_owned()),
        }
    }
}

/// Why an attempt (or a record) failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureReason {
    /// No HTTP status was received.
    Transport { kind: TransportKind, message: String },
    /// The server answered with a non-success status.
    Status { code: u16, body: String },
    /// The attempt budget ran out while failures were still retryable.
    Exhausted { last: Box<FailureReason> },
    /// The attempt loop ended without a final outcome.
    MaxAttemptsExceeded,
}

impl FailureReason {
    /// Short label used in reports: `ConnectionError`, `UnexpectedError`,
    /// `HTTP 503`, `MaxAttemptsExceeded`. Exhaustion reports the last reason seen.
    pub fn label(&self) -> String {
        match self {
            FailureReason::Transport {
                kind: TransportKind::Timeout | TransportKind::Connection,
                ..
            } => "ConnectionError".to_string(),
            FailureReason::Transport { .. } => "UnexpectedError".to_string(),
            FailureReason::Status { code, .. } => format!("HTTP {}", code),
            FailureReason::Exhausted { last } => last.label(),
            FailureReason::MaxAttemptsExceeded => "MaxAttemptsExceeded".to_string(),
        }
    }

    /// Diagnostic text: the transport error message or the response body.
    pub fn message(&self) -> &str {
        match self {
            FailureReason::Transport { message, .. } => message,
            FailureReason::Status { body, .. } => body,
            FailureReason::Exhausted { last } => last.message(),
            FailureReason::MaxAttemptsExceeded => "",
        }
    }

    /// The retry signal this reason was derived from, if any.
    pub fn signal(&self) -> Option<Signal> {
        match self {
            FailureReason::Transport { kind, .. } => Some(Signal::Transport(*kind)),
            FailureReason::Status { code, .. } => Some(Signal::Status(*code)),
            FailureReason::Exhausted { .. } | FailureReason::MaxAttemptsExceeded => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, FailureReason::Exhausted { .. })
    }
}

impl From<TransportError> for FailureReason {
    fn from(e: TransportError) -> Self {
        FailureReason::Transport {
            kind: e.kind,
            message: e.message,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message().trim();
        if message.is_empty() {
            write!(f, "{}", self.label())
        } else {
            write!(f, "{}: {}", self.label(), message)
        }
    }
}

/// Result of one attempt, and (for the last attempt) of the whole record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Success { status: u16, payload: ResponsePayload },
    RetryableFailure { reason: FailureReason, attempt: u32 },
    TerminalFailure { reason: FailureReason, attempt: u32 },
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Success { .. })
    }

    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            DeliveryOutcome::Success { .. } => None,
            DeliveryOutcome::RetryableFailure { reason, .. }
            | DeliveryOutcome::TerminalFailure { reason, .. } => Some(reason),
        }
    }
}

/// Final outcome of sending one record plus the number of attempts it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub outcome: DeliveryOutcome,
    pub attempts: u32,
}

impl Delivery {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Attempts beyond the first.
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}
