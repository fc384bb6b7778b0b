//! Runner configuration - optional YAML file for model, store and sources
//!
//! Every field has a default, so the binary runs without a config file:
//! fixture sources, `task_items.csv` next to the working directory, and
//! whatever model the CLI or environment selects.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::RoundupError;
use crate::sources::http::HttpSource;
use crate::sources::Sources;
use crate::workflow::state::AgentKind;

/// Default store file, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "task_items.csv";

/// Top-level runner configuration.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RunnerConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// Model selection; the CLI and environment can override either field.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ModelConfig {
    /// Provider: "OpenAI", "Gemini" or "Offline"
    pub provider: Option<String>,
    /// Provider-specific model name, e.g. "gpt-4o" or "gemini-1.5-flash"
    pub name: Option<String>,
}

/// Where merged task items are persisted.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

/// Where the collector agents fetch raw reports from.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourcesConfig {
    /// Source mode: "fixtures" or "http"
    pub mode: String,
    /// Base URL for compliance reports (http mode)
    pub compliance_url: Option<String>,
    /// Base URL for issue-tracker reports (http mode)
    pub tracker_url: Option<String>,
    /// Base URL for security-scan reports (http mode)
    pub scan_url: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            mode: "fixtures".to_string(),
            compliance_url: None,
            tracker_url: None,
            scan_url: None,
        }
    }
}

impl RunnerConfig {
    /// Load a runner configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RoundupError> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a runner configuration from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Self, RoundupError> {
        let config: RunnerConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }
}

impl SourcesConfig {
    /// Build the source bundle this configuration describes.
    pub fn build(&self) -> Result<Sources, RoundupError> {
        match self.mode.as_str() {
            "fixtures" => Ok(Sources::fixtures()),
            "http" => {
                let compliance = require_url("compliance_url", &self.compliance_url)?;
                let tracker = require_url("tracker_url", &self.tracker_url)?;
                let scan = require_url("scan_url", &self.scan_url)?;
                Ok(Sources {
                    compliance: Arc::new(HttpSource::new(AgentKind::Compliance, compliance)),
                    tracker: Arc::new(HttpSource::new(AgentKind::Issue, tracker)),
                    scan: Arc::new(HttpSource::new(AgentKind::Scan, scan)),
                })
            }
            other => Err(RoundupError::config(format!(
                "unknown source mode '{}': expected 'fixtures' or 'http'",
                other
            ))),
        }
    }
}

fn require_url(field: &str, value: &Option<String>) -> Result<String, RoundupError> {
    value
        .clone()
        .ok_or_else(|| RoundupError::config(format!("source mode 'http' requires {}", field)))
}
