//! CLI configuration file.
//!
//! ```toml
//! operation_timeout_secs = 60
//!
//! [api]
//! base_url = "https://vcenter.lab"
//! session_token = "..."
//! request_timeout_secs = 30
//! ```

use anyhow::{anyhow, Context, Result};
use hostsettings_sync::HttpClientConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub api: HttpClientConfig,
    /// Deadline for one whole operation, in seconds.
    pub operation_timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api: HttpClientConfig::default(),
            operation_timeout_secs: 60,
        }
    }
}

impl CliConfig {
    /// Loads the config file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    /// Deadline for an operation starting at `now`.
    pub fn deadline_from(&self, now: Instant) -> Result<Instant> {
        now.checked_add(self.operation_timeout()).ok_or_else(|| {
            anyhow!(
                "operation timeout of {}s is too large",
                self.operation_timeout_secs
            )
        })
    }
}
