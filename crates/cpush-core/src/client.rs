//! Per-record delivery with retries.
//!
//! `DeliveryClient::send` runs the attempt loop for one record: POST, classify
//! the result, and either return a final outcome or sleep the backoff delay and
//! try again. Transport failures and error statuses never escape as `Err`; they
//! become a `TerminalFailure` outcome.

use std::time::Duration;

use crate::endpoint::Endpoint;
use crate::outcome::{Delivery, DeliveryOutcome, FailureReason, ResponsePayload};
use crate::record::Record;
use crate::retry::{RetryDecision, RetryPolicy, Signal};
use crate::transport::{HttpResponse, Transport};

/// Per-attempt deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking pause between attempts and between records.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A record that cannot be put on the wire. This is a caller bug, not a
/// delivery failure, and is the only error `send` returns.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("record {code:?} is malformed: {reason}")]
    MalformedRecord { code: String, reason: &'static str },
    #[error("record {code:?} could not be encoded: {source}")]
    Encode {
        code: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Health probe failure: the endpoint is unreachable or not healthy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbeError {
    #[error("health check failed: {0}")]
    Transport(#[from] crate::retry::TransportError),
    #[error("health check returned HTTP {status}")]
    Status { status: u16, body: String },
}

pub struct DeliveryClient<T, S = ThreadSleeper> {
    transport: T,
    sleeper: S,
    endpoint: Endpoint,
    policy: RetryPolicy,
    request_timeout: Duration,
}

impl<T: Transport> DeliveryClient<T, ThreadSleeper> {
    pub fn new(transport: T, endpoint: Endpoint, policy: RetryPolicy) -> Self {
        Self::with_sleeper(transport, ThreadSleeper, endpoint, policy)
    }
}

impl<T: Transport, S: Sleeper> DeliveryClient<T, S> {
    pub fn with_sleeper(transport: T, sleeper: S, endpoint: Endpoint, policy: RetryPolicy) -> Self {
        Self {
            transport,
            sleeper,
            endpoint,
            policy,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// GET the health path; only HTTP 200 passes.
    pub fn check_health(&mut self, timeout: Duration) -> Result<HttpResponse, ProbeError> {
        let url = self.endpoint.health_url();
        let response = self.transport.get(&url, timeout)?;
        if response.status != 200 {
            return Err(ProbeError::Status {
                status: response.status,
                body: response.body_text(),
            });
        }
        Ok(response)
    }

    /// Block for `duration` using the client's sleeper.
    pub fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            self.sleeper.sleep(duration);
        }
    }

    /// Deliver one record, retrying transient failures per the policy.
    ///
    /// The returned outcome is always `Success` or `TerminalFailure`.
    pub fn send(&mut self, record: &Record) -> Result<Delivery, DeliveryError> {
        record
            .check()
            .map_err(|reason| DeliveryError::MalformedRecord {
                code: record.code.clone(),
                reason,
            })?;
        let body = record.to_json().map_err(|source| DeliveryError::Encode {
            code: record.code.clone(),
            source,
        })?;
        let url = self.endpoint.products_url();
        let max_attempts = self.policy.max_attempts();

        for attempt in 1..=max_attempts {
            tracing::info!(code = %record.code, name = %record.name, attempt, "sending record");
            let outcome = self.attempt(&url, &body, attempt);
            match outcome {
                DeliveryOutcome::RetryableFailure { reason, attempt } => {
                    let decision = reason
                        .signal()
                        .map(|signal| self.policy.decide(attempt, signal))
                        .unwrap_or(RetryDecision::NoRetry);
                    match decision {
                        RetryDecision::RetryAfter(delay) => {
                            tracing::warn!(
                                code = %record.code,
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                "{}, retrying",
                                reason
                            );
                            self.sleeper.sleep(delay);
                        }
                        RetryDecision::NoRetry => {
                            tracing::error!(code = %record.code, attempt, "giving up: {}", reason);
                            let outcome = DeliveryOutcome::TerminalFailure {
                                reason: FailureReason::Exhausted {
                                    last: Box::new(reason),
                                },
                                attempt,
                            };
                            return Ok(Delivery {
                                outcome,
                                attempts: attempt,
                            });
                        }
                    }
                }
                DeliveryOutcome::Success { status, .. } => {
                    tracing::info!(code = %record.code, attempt, status, "record delivered");
                    return Ok(Delivery {
                        outcome,
                        attempts: attempt,
                    });
                }
                DeliveryOutcome::TerminalFailure { ref reason, .. } => {
                    tracing::error!(code = %record.code, attempt, "terminal failure: {}", reason);
                    return Ok(Delivery {
                        outcome,
                        attempts: attempt,
                    });
                }
            }
        }

        tracing::error!(code = %record.code, max_attempts, "attempt budget exhausted");
        Ok(Delivery {
            outcome: DeliveryOutcome::TerminalFailure {
                reason: FailureReason::MaxAttemptsExceeded,
                attempt: max_attempts,
            },
            attempts: max_attempts,
        })
    }

    /// One POST, classified. Does not sleep.
    fn attempt(&mut self, url: &str, body: &[u8], attempt: u32) -> DeliveryOutcome {
        match self.transport.post_json(url, body, self.request_timeout) {
            Ok(response) if matches!(response.status, 200 | 201) => DeliveryOutcome::Success {
                status: response.status,
                payload: ResponsePayload::from_body(&response.body),
            },
            Ok(response) => {
                let signal = Signal::Status(response.status);
                let reason = FailureReason::Status {
                    code: response.status,
                    body: response.body_text(),
                };
                classify(&self.policy, signal, reason, attempt)
            }
            Err(e) => {
                let signal = Signal::Transport(e.kind);
                classify(&self.policy, signal, e.into(), attempt)
            }
        }
    }
}

fn classify(
    policy: &RetryPolicy,
    signal: Signal,
    reason: FailureReason,
    attempt: u32,
) -> DeliveryOutcome {
    if policy.is_retryable(signal) {
        DeliveryOutcome::RetryableFailure { reason, attempt }
    } else {
        DeliveryOutcome::TerminalFailure { reason, attempt }
    }
}
