//! @acp:module "Export Command"
//! @acp:summary "Export an element's parameters to an xlsx or csv workbook"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use super::{open_session, Target};
use crate::config::Config;
use crate::view::RecordFilter;

/// Options for the export command
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub target: Target,
    /// Workbook to write (.xlsx or .csv)
    pub output: PathBuf,
    /// Only export parameters whose name contains this text
    pub search: Option<String>,
    /// Skip read-only parameters
    pub editable_only: bool,
}

/// Execute the export command
pub fn execute_export(options: ExportOptions, config: Config) -> Result<()> {
    let mut session = open_session(&options.target, config)?;
    session.set_filter(RecordFilter {
        search: options.search.unwrap_or_default(),
        editable_only: options.editable_only,
    });

    let rows = session.export(&options.output)?;
    println!(
        "{} Exported {} parameter(s) to {}",
        style("✓").green(),
        rows,
        options.output.display()
    );
    Ok(())
}
