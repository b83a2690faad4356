//! `cpush send` – probe, deliver a catalog file, and report.

use anyhow::{Context, Result};
use cpush_core::config::CpushConfig;
use cpush_core::record;
use cpush_core::DeliveryRunner;
use std::path::Path;

/// Returns the run's exit code: 0 all delivered, 1 some failed, 2 aborted.
pub fn run_send(cfg: &CpushConfig, file: &Path, json: bool) -> Result<i32> {
    let records = record::load_records(file)?;
    tracing::info!(
        count = records.len(),
        file = %file.display(),
        endpoint = %cfg.endpoint,
        "loaded catalog"
    );
    let policy = cfg.retry_policy()?;
    tracing::info!(
        max_attempts = policy.max_attempts(),
        backoff_factor = policy.backoff_factor(),
        max_delay_ms = policy.max_delay().as_millis() as u64,
        "retry policy"
    );

    let runner = DeliveryRunner::from_config(cfg)?;
    let report = runner.run(records).context("catalog rejected before sending")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }
    Ok(report.exit_code())
}
