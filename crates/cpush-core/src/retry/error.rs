//! Transport error type for retry classification.

use serde::Serialize;

/// Coarse class of a transport failure. Timeouts and connection failures are
/// transient; anything else (bad URL, TLS setup, local curl misuse) is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// The per-attempt deadline expired.
    Timeout,
    /// Connect refused/reset, DNS failure, empty reply.
    Connection,
    /// Any other transport failure.
    Other,
}

/// Failure raised below HTTP: no status code was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportKind::Timeout, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(TransportKind::Connection, message)
    }
}
