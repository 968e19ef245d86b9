//! @acp:module "Add Command"
//! @acp:summary "Create a shared parameter and bind it to the element's category"
//! @acp:domain cli
//! @acp:layer handler

use anyhow::Result;
use console::style;

use super::{open_session, save_model, Target};
use crate::binding::NewParameter;
use crate::config::Config;
use crate::model::{group_label, Discipline, Scope, SpecType};

/// Options for the add command
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub target: Target,
    /// Parameter name
    pub name: String,
    /// Data type label, e.g. "Length" or "Yes/No"
    pub spec: String,
    /// Discipline label
    pub discipline: String,
    /// "Group Under" label
    pub group: String,
    /// "Instance" or "Type"
    pub scope: String,
}

impl AddOptions {
    /// Labels resolve the way workbook columns do; unknown labels fall back
    pub fn request(&self) -> NewParameter {
        NewParameter {
            name: self.name.trim().to_string(),
            discipline: Discipline::from_label(&self.discipline),
            spec: SpecType::from_label(&self.spec),
            group: group_label(&self.group).to_string(),
            scope: Scope::from_label(&self.scope),
        }
    }
}

/// Execute the add command
pub fn execute_add(options: AddOptions, config: Config) -> Result<()> {
    let request = options.request();
    let definition_file = config.definition_file.clone();

    let mut session = open_session(&options.target, config)?;
    session.add_parameter(&request)?;
    save_model(session, &options.target)?;

    println!(
        "{} Added {} ({}, {}, {})",
        style("✓").green(),
        style(&request.name).bold(),
        request.spec.label(),
        request.scope.label(),
        request.group
    );
    println!("  Definition file: {}", definition_file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_labels() {
        let options = AddOptions {
            name: " Fire Rating ".into(),
            spec: "Yes/No".into(),
            discipline: "Structural".into(),
            group: "no such group".into(),
            scope: "instance".into(),
            ..Default::default()
        };
        let request = options.request();
        assert_eq!(request.name, "Fire Rating");
        assert_eq!(request.spec, SpecType::YesNo);
        assert_eq!(request.discipline, Discipline::Structural);
        assert_eq!(request.group, "Other");
        assert_eq!(request.scope, Scope::Instance);
    }
}
