//! `cpush probe` – check the endpoint's health path.

use anyhow::Result;
use cpush_core::config::CpushConfig;

pub fn run_probe(cfg: &CpushConfig) -> Result<i32> {
    let mut client = cfg.build_client()?;
    let url = client.endpoint().health_url();
    match client.check_health(cfg.runner_options().probe_timeout) {
        Ok(response) => {
            println!("{} is healthy", url);
            tracing::debug!(body = %response.body_text(), "health payload");
            Ok(0)
        }
        Err(e) => {
            println!("{}: {}", url, e);
            Ok(2)
        }
    }
}
