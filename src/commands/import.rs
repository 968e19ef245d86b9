//! @acp:module "Import Command"
//! @acp:summary "Merge a workbook sheet into an element's parameters"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use super::{open_session, save_model, Target};
use crate::config::Config;

/// Options for the import command
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub target: Target,
    /// Workbook to read (.xlsx or .csv)
    pub input: PathBuf,
}

/// Execute the import command
pub fn execute_import(options: ImportOptions, config: Config) -> Result<()> {
    let mut session = open_session(&options.target, config)?;
    println!(
        "{} Importing {}...",
        style("→").cyan(),
        options.input.display()
    );

    let report = session.import(&options.input)?;
    save_model(session, &options.target)?;

    println!("{} Import complete", style("✓").green());
    println!("  Updated: {}", report.updated);
    println!("  Added: {}", report.added);
    println!("  Already set: {}", report.skipped);
    if report.ignored > 0 {
        println!("  {} Ignored: {}", style("⚠").yellow(), report.ignored);
    }
    if report.unresolved > 0 {
        println!("  {} Unresolved: {}", style("⚠").yellow(), report.unresolved);
    }
    Ok(())
}
