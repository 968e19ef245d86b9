//! @acp:module "Remove Command"
//! @acp:summary "Remove shared/project parameter bindings after confirmation"
//! @acp:domain cli
//! @acp:layer handler

use anyhow::{bail, Result};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};

use super::{open_session, save_model, Target};
use crate::config::Config;

/// Options for the remove command
#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    pub target: Target,
    /// Parameters whose bindings are removed
    pub names: Vec<String>,
    /// Skip the confirmation prompt
    pub yes: bool,
}

/// Execute the remove command
pub fn execute_remove(options: RemoveOptions, config: Config) -> Result<()> {
    if options.names.is_empty() {
        bail!("no parameters named");
    }

    let mut session = open_session(&options.target, config)?;
    session.select_only(&options.names)?;

    let yes = options.yes;
    let report = session.remove_selected(|names| {
        if yes {
            return true;
        }
        println!("{} The following parameters will be removed:", style("⚠").yellow());
        for name in names {
            println!("    {}", style(name).cyan());
        }
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Remove these parameter bindings from the model?")
            .default(false)
            .interact()
            .unwrap_or(false)
    })?;

    if report.removed.is_empty() && report.not_bound.is_empty() {
        println!("{} Nothing removed", style("→").dim());
        return Ok(());
    }

    for name in &report.not_bound {
        println!("  {} {} has no binding", style("⚠").yellow(), name);
    }
    let removed = report.removed.len();
    save_model(session, &options.target)?;
    println!(
        "{} Removed {} parameter binding(s)",
        style("✓").green(),
        removed
    );
    Ok(())
}
