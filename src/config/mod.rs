//! @acp:module "Configuration"
//! @acp:summary "Editor configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = ".paramgr.config.json";

fn default_definition_file() -> PathBuf {
    PathBuf::from("shared_parameters.txt")
}

fn default_definition_group() -> String {
    "Scripted".to_string()
}

fn default_true() -> bool {
    true
}

fn default_sheet_name_limit() -> usize {
    31
}

fn default_removal_delay_ms() -> u64 {
    100
}

fn default_model() -> PathBuf {
    PathBuf::from("model.json")
}

/// @acp:summary "Main configuration structure"
/// @acp:lock normal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Shared parameter definition file
    #[serde(default = "default_definition_file")]
    pub definition_file: PathBuf,

    /// Definition group new parameters are created in
    #[serde(default = "default_definition_group")]
    pub definition_group: String,

    /// Create the definition file when it does not exist yet
    #[serde(default = "default_true")]
    pub create_definition_file: bool,

    /// Maximum sheet name length of the workbook format
    #[serde(default = "default_sheet_name_limit")]
    pub sheet_name_limit: usize,

    /// Pause between successive binding-removal transactions
    #[serde(default = "default_removal_delay_ms")]
    pub removal_delay_ms: u64,

    /// Model file edited when no --model is given
    #[serde(default = "default_model")]
    pub model: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            definition_file: default_definition_file(),
            definition_group: default_definition_group(),
            create_definition_file: default_true(),
            sheet_name_limit: default_sheet_name_limit(),
            removal_delay_ms: default_removal_delay_ms(),
            model: default_model(),
        }
    }
}

impl Config {
    /// @acp:summary "Load config from a JSON file"
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @acp:summary "Load from default location or fall back to defaults"
    pub fn load_or_default() -> Self {
        Self::load(CONFIG_FILE).unwrap_or_default()
    }

    pub fn removal_delay(&self) -> Duration {
        Duration::from_millis(self.removal_delay_ms)
    }
}
