//! Runner configuration
//!
//! Settings come from an optional TOML file and are then overridden by
//! `DATAMOVER_*` environment variables. Every field has a default, so an empty
//! file or no file at all is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub mod loader;

pub use loader::{load_args, load_template_params};

pub const ENV_JOB_PREFIX: &str = "DATAMOVER_JOB_PREFIX";
pub const ENV_PULL_TOOL: &str = "DATAMOVER_PULL_TOOL";
pub const ENV_KUBECTL: &str = "DATAMOVER_KUBECTL";
pub const ENV_POLL_INTERVAL: &str = "DATAMOVER_POLL_INTERVAL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Prefix of generated job names
    pub job_name_prefix: String,
    /// Program (and flags) that streams artifacts out of the object store
    pub pull_tool: String,
    pub kubectl: String,
    /// Delay between job status polls
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Upper bound for any single kubectl call
    #[serde(with = "humantime_serde")]
    pub kubectl_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            job_name_prefix: "prepare-data-job-".to_string(),
            pull_tool: crate::location::DEFAULT_PULL_TOOL.to_string(),
            kubectl: "kubectl".to_string(),
            poll_interval: Duration::from_secs(2),
            kubectl_timeout: Duration::from_secs(30),
        }
    }
}

impl RunnerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse runner configuration")
    }

    /// Loads `path` if given, then applies environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_toml_str(&content)
                    .with_context(|| format!("Invalid config file {}", path.display()))?
            }
            None => Self::default(),
        };
        config.merge_env_vars(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies overrides from `lookup`, which maps variable names to values
    pub fn merge_env_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = lookup(ENV_JOB_PREFIX) {
            self.job_name_prefix = prefix;
        }

        if let Some(tool) = lookup(ENV_PULL_TOOL) {
            self.pull_tool = tool;
        }

        if let Some(kubectl) = lookup(ENV_KUBECTL) {
            self.kubectl = kubectl;
        }

        if let Some(interval) = lookup(ENV_POLL_INTERVAL) {
            self.poll_interval = humantime::parse_duration(&interval)
                .with_context(|| format!("Invalid {ENV_POLL_INTERVAL} value '{interval}'"))?;
        }

        Ok(())
    }
}
