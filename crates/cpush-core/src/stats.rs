//! Per-run delivery counters.

use std::time::Instant;

/// Totals for one run. Counters only grow; the runner owns the only instance.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    total: u64,
    successful: u64,
    failed: u64,
    retries_used: u64,
    start_time: Option<Instant>,
    end_time: Option<Instant>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of sending `total` records.
    pub fn begin(&mut self, total: u64) {
        self.total = total;
        self.start_time = Some(Instant::now());
    }

    /// Mark the end of the run.
    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    pub fn record_success(&mut self) {
        self.successful += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn record_retry(&mut self) {
        self.retries_used += 1;
    }

    pub fn add_retries(&mut self, retries: u32) {
        self.retries_used += u64::from(retries);
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn successful(&self) -> u64 {
        self.successful
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn retries_used(&self) -> u64 {
        self.retries_used
    }

    /// Records with a final outcome so far.
    pub fn processed(&self) -> u64 {
        self.successful + self.failed
    }

    /// Percentage of records delivered; 0.0 when nothing was attempted.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.successful as f64 / self.total as f64 * 100.0
    }

    /// Seconds between `begin` and `finish`, or 0.0 if either is missing.
    pub fn duration(&self) -> f64 {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).as_secs_f64(),
            _ => 0.0,
        }
    }
}
