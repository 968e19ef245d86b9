//! @acp:module "Show Command"
//! @acp:summary "Print the parameter records of an element"
//! @acp:domain cli
//! @acp:layer handler

use anyhow::Result;
use console::style;

use super::{open_session, Target};
use crate::config::Config;
use crate::host::Document;
use crate::view::{ParameterRecord, RecordFilter};

/// Options for the show command
#[derive(Debug, Clone, Default)]
pub struct ShowOptions {
    pub target: Target,
    /// Case-insensitive name filter
    pub search: Option<String>,
    /// Hide read-only parameters
    pub editable_only: bool,
    /// Output as JSON
    pub json: bool,
}

/// Execute the show command
pub fn execute_show(options: ShowOptions, config: Config) -> Result<()> {
    let mut session = open_session(&options.target, config)?;
    session.set_filter(RecordFilter {
        search: options.search.unwrap_or_default(),
        editable_only: options.editable_only,
    });
    let records = session.visible();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let element = session.context().element;
    let title = session
        .document()
        .element(element)
        .and_then(|e| e.display_name())
        .unwrap_or("<unnamed>")
        .to_string();
    println!(
        "{} {} ({} parameters)",
        style("→").cyan(),
        style(format!("{} [{}]", title, element)).bold(),
        records.len()
    );

    let width = records.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for record in &records {
        print_record(record, width);
    }
    Ok(())
}

fn print_record(record: &ParameterRecord, width: usize) {
    let marker = if record.editable {
        style("✎").green()
    } else {
        style("·").dim()
    };
    let value = if record.value.is_empty() {
        style("-".to_string()).dim()
    } else {
        style(record.value.clone())
    };
    println!(
        "  {} {:<width$}  {:<8} {:<9} {}",
        marker,
        record.name,
        record.scope.label(),
        record.type_label,
        value,
        width = width
    );
}
