use crate::editor::history::DEFAULT_HISTORY_LIMIT;
use crate::reconcile::ReconcileOptions;
use crate::rounds::mapper::{DEFAULT_POST_DELAY, MapperOptions};
use crate::siming::ActionDelays;
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_API_BASE: &str = "https://prts.maa.plus";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings shared by the CLI and editor sessions. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_post_delay: u32,
    pub action_delays: ActionDelays,
    pub history_limit: usize,
    pub api: ApiConfig,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_post_delay: DEFAULT_POST_DELAY,
            action_delays: ActionDelays::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            api: ApiConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Remote graph conversion endpoint. Conversion is unavailable without it.
    pub siming_endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            siming_endpoint: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn load(file_path: impl AsRef<Path>) -> Result<Self> {
        let file_path = file_path.as_ref();
        let yaml_content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read config file from {}", file_path.display()))?;

        Self::from_yaml_str(&yaml_content)
            .with_context(|| format!("Failed to deserialize config from {}", file_path.display()))
    }

    pub fn from_yaml_str(yaml: &str) -> crate::error::Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn mapper_options(&self) -> MapperOptions {
        MapperOptions {
            default_post_delay: self.default_post_delay,
            ..Default::default()
        }
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            mapper: self.mapper_options(),
            action_delays: self.action_delays,
        }
    }
}
