use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use publishing_core::CoreConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration that can be loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Directory the document is stored in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// URL or path `demo` loads when no source is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,

    /// Directory `export` and `pack --out` write to by default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: CliConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize config")
    }

    /// Storage settings: `--data-dir` flag, then the config file, then the platform default
    pub fn core_config(&self, data_dir_flag: Option<&Path>) -> CoreConfig {
        match data_dir_flag.or(self.data_dir.as_deref()) {
            Some(dir) => CoreConfig::new(dir),
            None => CoreConfig::default(),
        }
    }

    /// Where exports go when no `--out` is given
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
