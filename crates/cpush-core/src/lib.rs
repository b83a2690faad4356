//! cpush core: resilient, strictly sequential delivery of catalog records to an
//! HTTP endpoint, with exponential backoff and per-run accounting.

pub mod config;
pub mod logging;

pub mod client;
pub mod endpoint;
pub mod outcome;
pub mod record;
pub mod report;
pub mod retry;
pub mod runner;
pub mod stats;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{DeliveryClient, DeliveryError, ProbeError, Sleeper, ThreadSleeper};
pub use endpoint::Endpoint;
pub use outcome::{Delivery, DeliveryOutcome, FailureReason, ResponsePayload};
pub use record::Record;
pub use report::{FailureRecord, RunOutcome, RunReport};
pub use retry::RetryPolicy;
pub use runner::{DeliveryRunner, RunState, RunnerOptions};
pub use stats::RunStats;
pub use transport::{CurlTransport, HttpResponse, Transport};
