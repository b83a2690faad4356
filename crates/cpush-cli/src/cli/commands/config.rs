//! `cpush config` – show the effective configuration.

use anyhow::Result;
use cpush_core::config::CpushConfig;
use std::path::Path;

pub fn run_config(cfg: &CpushConfig, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        println!("# {}", path.display());
    }
    let mut effective = cfg.clone();
    effective.retry = Some(cfg.retry_config());
    print!("{}", toml::to_string_pretty(&effective)?);
    Ok(())
}
