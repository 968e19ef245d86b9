//! @acp:module "Set Command"
//! @acp:summary "Edit parameter values and apply them, optionally to similar elements"
//! @acp:domain cli
//! @acp:layer handler

use anyhow::{bail, Result};
use console::style;

use super::{open_session, save_model, Target};
use crate::config::Config;

/// Options for the set command
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    pub target: Target,
    /// `NAME=VALUE` assignments
    pub assignments: Vec<String>,
    /// Also write to elements of the same category and type
    pub similar: bool,
}

/// Split `NAME=VALUE` at the first `=`
pub fn parse_assignment(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => bail!("expected NAME=VALUE, got '{}'", raw),
    }
}

/// Execute the set command
pub fn execute_set(options: SetOptions, config: Config) -> Result<()> {
    let assignments = options
        .assignments
        .iter()
        .map(|a| parse_assignment(a))
        .collect::<Result<Vec<_>>>()?;
    if assignments.is_empty() {
        bail!("nothing to set");
    }

    let mut session = open_session(&options.target, config)?;
    for (name, value) in &assignments {
        session.edit(name, value.clone())?;
    }
    let names: Vec<&str> = assignments.iter().map(|(n, _)| n.as_str()).collect();
    session.select_only(&names)?;

    let report = session.apply(options.similar)?;
    save_model(session, &options.target)?;

    println!(
        "{} Wrote {} value(s)",
        style("✓").green(),
        report.written
    );
    if options.similar {
        println!("  Similar elements: {}", report.similar);
    }
    if report.skipped_read_only > 0 {
        println!(
            "  {} Skipped {} read-only parameter(s)",
            style("⚠").yellow(),
            report.skipped_read_only
        );
    }
    if report.ignored > 0 {
        println!(
            "  {} Ignored {} value(s) that did not fit the parameter type",
            style("⚠").yellow(),
            report.ignored
        );
    }
    Ok(())
}
