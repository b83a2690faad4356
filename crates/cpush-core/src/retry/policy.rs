use std::collections::BTreeSet;
use std::time::Duration;

use super::error::TransportKind;

/// Statuses retried when the configuration does not say otherwise.
pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 5] = [500, 502, 503, 504, 408];

/// What a single attempt observed, as far as retry decisions care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// No HTTP status was received.
    Transport(TransportKind),
    /// The server answered with this status.
    Status(u16),
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this failure.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Rejected retry parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
    #[error("initial_delay must be a positive duration")]
    InvalidInitialDelay,
    #[error("max_delay must be a duration no smaller than initial_delay")]
    InvalidMaxDelay,
    #[error("backoff_factor must be a finite number >= 1.0 (got {0})")]
    InvalidBackoffFactor(f64),
}

/// Exponential backoff policy with caps.
///
/// The policy is plain data: every method is a pure function of its inputs, so
/// one instance can be shared by any number of clients.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    backoff_factor: f64,
    retryable_status_codes: BTreeSet<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(16),
            backoff_factor: 2.0,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.into_iter().collect(),
        }
    }
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
        backoff_factor: f64,
        retryable_status_codes: impl IntoIterator<Item = u16>,
    ) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        if initial_delay.is_zero() {
            return Err(PolicyError::InvalidInitialDelay);
        }
        if max_delay < initial_delay {
            return Err(PolicyError::InvalidMaxDelay);
        }
        if !backoff_factor.is_finite() || backoff_factor < 1.0 {
            return Err(PolicyError::InvalidBackoffFactor(backoff_factor));
        }
        Ok(Self {
            max_attempts,
            initial_delay,
            max_delay,
            backoff_factor,
            retryable_status_codes: retryable_status_codes.into_iter().collect(),
        })
    }

    /// Maximum number of attempts per record (including the first).
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    pub fn retryable_status_codes(&self) -> impl Iterator<Item = u16> + '_ {
        self.retryable_status_codes.iter().copied()
    }

    /// Delay to wait after failed attempt `attempt` (1-based) before the next one:
    /// `min(initial_delay * backoff_factor^(attempt-1), max_delay)`.
    ///
    /// Never consulted before the first attempt; `attempt == 0` is treated as 1.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        if exp == 0 {
            return self.initial_delay;
        }
        let raw = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exp);
        if !raw.is_finite() || raw >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(raw).max(self.initial_delay)
    }

    /// True for timeouts, connection failures, and configured statuses.
    ///
    /// 200 and 201 are successes and never retryable, even if listed.
    pub fn is_retryable(&self, signal: Signal) -> bool {
        match signal {
            Signal::Transport(TransportKind::Timeout | TransportKind::Connection) => true,
            Signal::Transport(TransportKind::Other) => false,
            Signal::Status(200 | 201) => false,
            Signal::Status(code) => self.retryable_status_codes.contains(&code),
        }
    }

    /// Combine eligibility and budget for a failed attempt.
    ///
    /// `attempt` is 1-based (1 = first attempt). Returns `RetryDecision::NoRetry`
    /// when the signal is terminal or the attempt budget is spent.
    pub fn decide(&self, attempt: u32, signal: Signal) -> RetryDecision {
        if attempt >= self.max_attempts || !self.is_retryable(signal) {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.delay_for(attempt))
    }
}
