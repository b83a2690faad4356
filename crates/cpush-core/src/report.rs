//! End-of-run report.

use serde::Serialize;
use std::fmt;

use crate::outcome::{DeliveryOutcome, FailureReason};
use crate::record::Record;
use crate::runner::RunState;
use crate::stats::RunStats;

/// A record whose final outcome was a failure.
#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    pub record: Record,
    pub outcome: DeliveryOutcome,
    pub attempts: u32,
}

impl FailureRecord {
    pub fn reason(&self) -> Option<&FailureReason> {
        self.outcome.reason()
    }
}

/// How the run ended, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every record was delivered.
    Succeeded,
    /// The batch ran to the end but some records failed.
    CompletedWithFailures,
    /// The health probe failed; nothing was sent.
    Aborted { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub state: RunState,
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub retries_used: u64,
    pub success_rate: f64,
    pub duration_secs: f64,
    pub failures: Vec<FailureRecord>,
}

impl RunReport {
    pub(crate) fn finished(stats: &RunStats, state: RunState, failures: Vec<FailureRecord>) -> Self {
        let outcome = if stats.failed() > 0 {
            RunOutcome::CompletedWithFailures
        } else {
            RunOutcome::Succeeded
        };
        Self::from_stats(stats, outcome, state, failures)
    }

    pub(crate) fn aborted(stats: &RunStats, state: RunState, reason: String) -> Self {
        Self::from_stats(stats, RunOutcome::Aborted { reason }, state, Vec::new())
    }

    fn from_stats(
        stats: &RunStats,
        outcome: RunOutcome,
        state: RunState,
        failures: Vec<FailureRecord>,
    ) -> Self {
        Self {
            outcome,
            state,
            total: stats.total(),
            successful: stats.successful(),
            failed: stats.failed(),
            retries_used: stats.retries_used(),
            success_rate: stats.success_rate(),
            duration_secs: stats.duration(),
            failures,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Succeeded
    }

    /// 0 when every record was delivered, 1 when some failed, 2 when the run
    /// could not start.
    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            RunOutcome::Succeeded => 0,
            RunOutcome::CompletedWithFailures => 1,
            RunOutcome::Aborted { .. } => 2,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{rule}")?;
        writeln!(f, "DELIVERY REPORT")?;
        writeln!(f, "{rule}")?;
        if let RunOutcome::Aborted { reason } = &self.outcome {
            writeln!(f, "Run aborted before sending: {}", reason)?;
            return write!(f, "{rule}");
        }
        writeln!(f, "Duration:      {:.1}s", self.duration_secs)?;
        writeln!(f, "Total records: {}", self.total)?;
        writeln!(f, "Delivered:     {}", self.successful)?;
        writeln!(f, "Failed:        {}", self.failed)?;
        writeln!(f, "Success rate:  {:.1}%", self.success_rate)?;
        writeln!(f, "Retries used:  {}", self.retries_used)?;
        if !self.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failed records ({}):", self.failures.len())?;
            for failure in &self.failures {
                let reason = failure
                    .reason()
                    .map(|r| r.label())
                    .unwrap_or_else(|| "unknown".to_string());
                writeln!(
                    f,
                    "  - {} ({}): {} after {} attempt(s)",
                    failure.record.code, failure.record.name, reason, failure.attempts
                )?;
            }
        }
        write!(f, "{rule}")
    }
}
