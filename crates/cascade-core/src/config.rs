//! Engine configuration loaded from a TOML file.
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! `CASCADE_POLL_INTERVAL_MS` takes precedence over the file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

pub const POLL_INTERVAL_ENV: &str = "CASCADE_POLL_INTERVAL_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Wait between scheduler iterations.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Deadline for a single job run. `None` lets a job run forever.
    #[serde(default)]
    pub job_timeout_ms: Option<u64>,

    #[serde(default = "default_notification_delay_ms")]
    pub notification_delay_ms: u64,

    #[serde(default = "default_long_job_duration_ms")]
    pub long_job_duration_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_notification_delay_ms() -> u64 {
    500
}

fn default_long_job_duration_ms() -> u64 {
    30_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            job_timeout_ms: None,
            notification_delay_ms: default_notification_delay_ms(),
            long_job_duration_ms: default_long_job_duration_ms(),
        }
    }
}

impl EngineConfig {
    /// Read `path` if it exists (defaults otherwise), then apply env overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<EngineConfig>(&contents)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process env in `load`).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup(POLL_INTERVAL_ENV)
            && !raw.is_empty()
        {
            self.poll_interval_ms = raw.trim().parse().map_err(|_| {
                CoreError::Config(format!("{POLL_INTERVAL_ENV} must be an integer, got {raw:?}"))
            })?;
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout_ms.map(Duration::from_millis)
    }

    pub fn notification_delay(&self) -> Duration {
        Duration::from_millis(self.notification_delay_ms)
    }

    pub fn long_job_duration(&self) -> Duration {
        Duration::from_millis(self.long_job_duration_ms)
    }
}
