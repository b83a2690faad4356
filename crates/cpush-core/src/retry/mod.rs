//! Retry and backoff policy.
//!
//! This module encapsulates failure classification (timeouts, connection
//! failures, retryable HTTP statuses) and exponential backoff decisions so the
//! delivery client and its tests share one stateless policy.

mod classify;
mod error;
mod policy;

pub use classify::classify_curl_error;
pub use error::{TransportError, TransportKind};
pub use policy::{PolicyError, RetryDecision, RetryPolicy, Signal, DEFAULT_RETRYABLE_STATUS_CODES};
