use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::DeliveryClient;
use crate::endpoint::Endpoint;
use crate::retry::{PolicyError, RetryPolicy, DEFAULT_RETRYABLE_STATUS_CODES};
use crate::runner::RunnerOptions;
use crate::transport::CurlTransport;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per record (including the first).
    pub max_attempts: u32,
    /// Delay in seconds before the second attempt (e.g. 0.5 = 500ms).
    pub initial_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: f64,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_factor: f64,
    /// HTTP statuses treated as transient.
    pub retryable_status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_secs: 1.0,
            max_delay_secs: 16.0,
            backoff_factor: 2.0,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.to_vec(),
        }
    }
}

impl RetryConfig {
    /// Validate and build the policy.
    pub fn to_policy(&self) -> Result<RetryPolicy, PolicyError> {
        let initial = Duration::try_from_secs_f64(self.initial_delay_secs)
            .map_err(|_| PolicyError::InvalidInitialDelay)?;
        let max = Duration::try_from_secs_f64(self.max_delay_secs)
            .map_err(|_| PolicyError::InvalidMaxDelay)?;
        RetryPolicy::new(
            self.max_attempts,
            initial,
            max,
            self.backoff_factor,
            self.retryable_status_codes.iter().copied(),
        )
    }
}

/// Global configuration loaded from `~/.config/cpush/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpushConfig {
    /// Base URL of the receiving API.
    pub endpoint: String,
    /// Pause between records in milliseconds.
    pub send_pause_ms: u64,
    /// Per-attempt request deadline in seconds.
    pub request_timeout_secs: u64,
    /// Health probe deadline in seconds.
    pub probe_timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    pub retry: Option<RetryConfig>,
}

impl Default for CpushConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000".to_string(),
            send_pause_ms: 100,
            request_timeout_secs: 10,
            probe_timeout_secs: 5,
            retry: None,
        }
    }
}

impl CpushConfig {
    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        self.retry_config()
            .to_policy()
            .context("invalid [retry] configuration")
    }

    pub fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::parse(&self.endpoint).with_context(|| format!("endpoint {:?}", self.endpoint))
    }

    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            send_pause: Duration::from_millis(self.send_pause_ms),
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
        }
    }

    /// Delivery client over a fresh curl session.
    pub fn build_client(&self) -> Result<DeliveryClient<CurlTransport>> {
        let transport = CurlTransport::new().context("failed to set up HTTP session")?;
        let client = DeliveryClient::new(transport, self.endpoint()?, self.retry_policy()?)
            .request_timeout(Duration::from_secs(self.request_timeout_secs.max(1)));
        Ok(client)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("cpush")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CpushConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CpushConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<CpushConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: CpushConfig =
        toml::from_str(&data).with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(cfg)
}
