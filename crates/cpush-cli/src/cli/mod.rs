//! CLI for cpush.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use cpush_core::config::{self, CpushConfig};
use std::path::PathBuf;

use commands::{run_completions, run_config, run_man, run_probe, run_send};

/// Top-level CLI for cpush.
#[derive(Debug, Parser)]
#[command(name = "cpush")]
#[command(about = "cpush: deliver cleaned catalog records to an HTTP endpoint with retries", long_about = None)]
pub struct Cli {
    /// Use this config file instead of ~/.config/cpush/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for run logs (default ~/.local/state/cpush).
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Overrides applied on top of the loaded config.
#[derive(Debug, Default, Clone, PartialEq, clap::Args)]
pub struct EndpointArgs {
    /// Base URL of the receiving API (e.g. http://localhost:5000).
    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Probe the endpoint, send every record in FILE, and print a report.
    Send {
        /// Cleaned catalog: JSON array or JSON Lines of records.
        file: PathBuf,

        #[command(flatten)]
        endpoint: EndpointArgs,

        /// Maximum attempts per record (including the first).
        #[arg(long, value_name = "N")]
        max_attempts: Option<u32>,

        /// Pause between records in milliseconds.
        #[arg(long, value_name = "MS")]
        pause_ms: Option<u64>,

        /// Print the report as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Check the endpoint's health path and exit.
    Probe {
        #[command(flatten)]
        endpoint: EndpointArgs,
    },

    /// Print the effective configuration and where it was loaded from.
    Config,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },

    /// Generate a man page (roff) on stdout.
    Man,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    fn load_config(&self) -> Result<(CpushConfig, Option<PathBuf>)> {
        match &self.config {
            Some(path) => Ok((config::load_from_path(path)?, Some(path.clone()))),
            None => {
                let cfg = config::load_or_init()?;
                Ok((cfg, config::config_path().ok()))
            }
        }
    }

    /// Dispatch the subcommand. Returns the process exit code.
    pub fn run(self) -> Result<i32> {
        match &self.command {
            CliCommand::Completions { shell } => return run_completions(*shell).map(|_| 0),
            CliCommand::Man => return run_man().map(|_| 0),
            _ => {}
        }

        let (mut cfg, path) = self.load_config()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Send {
                file,
                endpoint,
                max_attempts,
                pause_ms,
                json,
            } => {
                apply_send_overrides(&mut cfg, &endpoint, max_attempts, pause_ms);
                run_send(&cfg, &file, json)
            }
            CliCommand::Probe { endpoint } => {
                endpoint.apply(&mut cfg);
                run_probe(&cfg)
            }
            CliCommand::Config => run_config(&cfg, path.as_deref()).map(|_| 0),
            CliCommand::Completions { .. } | CliCommand::Man => Ok(0),
        }
    }
}

impl EndpointArgs {
    fn apply(&self, cfg: &mut CpushConfig) {
        if let Some(endpoint) = &self.endpoint {
            cfg.endpoint = endpoint.clone();
        }
    }
}

/// Flags given to `send` replace the matching config values.
pub(crate) fn apply_send_overrides(
    cfg: &mut CpushConfig,
    endpoint: &EndpointArgs,
    max_attempts: Option<u32>,
    pause_ms: Option<u64>,
) {
    endpoint.apply(cfg);
    if let Some(n) = max_attempts {
        let mut retry = cfg.retry_config();
        retry.max_attempts = n;
        cfg.retry = Some(retry);
    }
    if let Some(ms) = pause_ms {
        cfg.send_pause_ms = ms;
    }
}

#[cfg(test)]
mod tests;
