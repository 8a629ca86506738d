//! Workflow settings file

use anyhow::Context;
use erasure_core::WorkflowConfig;
use serde::Deserialize;
use std::path::Path;

/// Top-level layout of the settings file
///
/// ```toml
/// [workflow]
/// tick_interval_ms = 1000
/// record_collection = "users"
///
/// [workflow.confirmation]
/// mode = "countdown"
/// seconds = 5
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) workflow: WorkflowConfig,
}

impl Settings {
    pub(crate) fn parse(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid settings file")
    }

    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("failed to load {}", path.display()))
    }
}

/// Resolve the workflow configuration from an optional file and flag overrides
pub(crate) fn resolve(path: Option<&Path>, countdown: Option<u32>) -> anyhow::Result<WorkflowConfig> {
    let mut config = match path {
        Some(path) => Settings::load(path)?.workflow,
        None => WorkflowConfig::new(),
    };
    if let Some(seconds) = countdown {
        config = config.with_countdown(seconds);
    }
    config.validate()?;
    Ok(config)
}
