//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Provides implementations for all CLI commands.
//! Each command is in its own submodule for maintainability.

pub mod add;
pub mod export;
pub mod import;
pub mod init;
pub mod remove;
pub mod set;
pub mod show;

pub use add::{execute_add, AddOptions};
pub use export::{execute_export, ExportOptions};
pub use import::{execute_import, ImportOptions};
pub use init::{execute_init, InitOptions};
pub use remove::{execute_remove, RemoveOptions};
pub use set::{execute_set, SetOptions};
pub use show::{execute_show, ShowOptions};

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::host::MemoryDocument;
use crate::model::ElementId;
use crate::session::ParameterSession;

/// Model file and element a command works on
#[derive(Debug, Clone, Default)]
pub struct Target {
    /// Model file; the config's `model` when absent
    pub model: Option<PathBuf>,
    /// Element to edit; the model's first selected element when absent
    pub element: Option<ElementId>,
}

impl Target {
    pub fn model_path(&self, config: &Config) -> PathBuf {
        self.model.clone().unwrap_or_else(|| config.model.clone())
    }
}

/// Load the model and open an editor session on the target element
pub fn open_session(target: &Target, config: Config) -> Result<ParameterSession<MemoryDocument>> {
    let path = target.model_path(&config);
    let document = MemoryDocument::load(&path)
        .with_context(|| format!("failed to load model {}", path.display()))?;
    let session = ParameterSession::open(document, target.element, config)?;
    Ok(session)
}

/// Write the session's document back to the model file
pub fn save_model(session: ParameterSession<MemoryDocument>, target: &Target) -> Result<()> {
    let path = target.model_path(session.config());
    session
        .into_document()
        .save(&path)
        .with_context(|| format!("failed to save model {}", path.display()))?;
    Ok(())
}
