//! Batch delivery: probe, send every record in order, report.
//!
//! ```text
//! Idle ──probe──► Connecting ──ok──► Sending ──last record──► Finalized
//!                     │
//!                     └─fail─► (aborted, nothing sent)
//! ```

use serde::Serialize;
use std::time::Duration;

use crate::client::{DeliveryClient, DeliveryError, Sleeper, ThreadSleeper};
use crate::config::CpushConfig;
use crate::record::Record;
use crate::report::{FailureRecord, RunReport};
use crate::stats::RunStats;
use crate::transport::{CurlTransport, Transport};

/// Deadline for the health probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause between consecutive records.
pub const DEFAULT_SEND_PAUSE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Connecting,
    Sending,
    Finalized,
}

#[derive(Debug, Clone, Copy)]
pub struct RunnerOptions {
    pub send_pause: Duration,
    pub probe_timeout: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            send_pause: DEFAULT_SEND_PAUSE,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// Drives one run. Consumed by [`DeliveryRunner::run`], so a runner cannot be
/// reused once finalized.
pub struct DeliveryRunner<T, S = ThreadSleeper> {
    client: DeliveryClient<T, S>,
    options: RunnerOptions,
    stats: RunStats,
    state: RunState,
}

impl DeliveryRunner<CurlTransport, ThreadSleeper> {
    /// Runner over a fresh curl session, configured from `cfg`.
    pub fn from_config(cfg: &CpushConfig) -> anyhow::Result<Self> {
        let client = cfg.build_client()?;
        Ok(Self::new(client, cfg.runner_options()))
    }
}

impl<T: Transport, S: Sleeper> DeliveryRunner<T, S> {
    pub fn new(client: DeliveryClient<T, S>, options: RunnerOptions) -> Self {
        Self {
            client,
            options,
            stats: RunStats::new(),
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Probe the endpoint, then deliver `records` strictly in order.
    ///
    /// Per-record failures are collected in the report. A failed probe yields an
    /// aborted report with zero totals. The whole batch is checked before the
    /// probe, so a malformed record returns `Err` while nothing has been sent.
    pub fn run<I>(mut self, records: I) -> Result<RunReport, DeliveryError>
    where
        I: IntoIterator<Item = Record>,
    {
        let records: Vec<Record> = records.into_iter().collect();
        for record in &records {
            record
                .check()
                .map_err(|reason| DeliveryError::MalformedRecord {
                    code: record.code.clone(),
                    reason,
                })?;
        }

        self.state = RunState::Connecting;
        tracing::info!(endpoint = %self.client.endpoint().base(), "checking endpoint health");
        match self.client.check_health(self.options.probe_timeout) {
            Ok(response) => {
                tracing::info!("endpoint healthy");
                tracing::debug!(body = %response.body_text(), "health payload");
            }
            Err(e) => {
                tracing::error!("aborting run: {}", e);
                return Ok(RunReport::aborted(&self.stats, self.state, e.to_string()));
            }
        }

        let mut records = records.into_iter().peekable();
        self.stats.begin(records.len() as u64);
        self.state = RunState::Sending;
        tracing::info!(total = self.stats.total(), "sending records");

        let mut failures = Vec::new();
        while let Some(record) = records.next() {
            let delivery = self.client.send(&record)?;
            self.stats.add_retries(delivery.retries());
            if delivery.is_success() {
                self.stats.record_success();
            } else {
                self.stats.record_failure();
                if let Some(reason) = delivery.outcome.reason() {
                    tracing::error!(
                        code = %record.code,
                        attempts = delivery.attempts,
                        "failed to deliver record: {}",
                        reason
                    );
                }
                failures.push(FailureRecord {
                    record,
                    outcome: delivery.outcome,
                    attempts: delivery.attempts,
                });
            }
            if records.peek().is_some() {
                self.client.pause(self.options.send_pause);
            }
        }

        self.stats.finish();
        self.state = RunState::Finalized;
        tracing::info!(
            successful = self.stats.successful(),
            total = self.stats.total(),
            failed = self.stats.failed(),
            retries = self.stats.retries_used(),
            "run finished: {}/{} delivered ({:.1}%)",
            self.stats.successful(),
            self.stats.total(),
            self.stats.success_rate()
        );
        Ok(RunReport::finished(&self.stats, self.state, failures))
    }
}
