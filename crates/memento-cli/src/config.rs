use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use memento_registry::ConfirmationMode;
use memento_workflow::WorkflowConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "memento.toml";

/// Settings read from `memento.toml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Holds the wallet key and the registry state.
    pub state_dir: PathBuf,
    pub confirmation: ConfirmationMode,
    pub workflow: WorkflowConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(".memento"),
            confirmation: ConfirmationMode::Instant,
            workflow: WorkflowConfig::default(),
        }
    }
}

impl CliConfig {
    /// Read `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text)
                .with_context(|| format!("invalid configuration in {}", path.display())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("cannot read {}", path.display())),
        }
    }

    pub fn key_path(&self) -> PathBuf {
        self.state_dir.join("wallet.key")
    }

    pub fn registry_path(&self) -> PathBuf {
        self.state_dir.join("registry.json")
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
