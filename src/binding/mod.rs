//! @acp:module "Parameter Binding"
//! @acp:summary "Create/bind shared parameters and remove bindings safely"
//! @acp:domain definitions
//! @acp:layer service

use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::definitions::DefinitionFile;
use crate::error::{ParamError, Result};
use crate::host::{Document, Transaction};
use crate::model::{Discipline, ElementId, ParameterBinding, Scope, SpecType};

/// @acp:summary "Request to add a parameter to an element's category"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParameter {
    pub name: String,
    pub discipline: Discipline,
    pub spec: SpecType,
    pub group: String,
    pub scope: Scope,
}

/// @acp:summary "Find or create the definition and bind it to a category"
///
/// Must run inside an open transaction on `doc`.
pub fn bind_definition<D: Document + ?Sized>(
    doc: &mut D,
    category: ElementId,
    definitions: &mut DefinitionFile,
    definition_group: &str,
    request: &NewParameter,
) -> Result<ParameterBinding> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ParamError::EmptyName);
    }

    let definition = definitions.find_or_create(definition_group, name, request.spec);
    let binding = ParameterBinding {
        definition,
        scope: request.scope,
        category,
        group: request.group.clone(),
        discipline: request.discipline,
    };
    doc.bind(&binding)?;
    info!(name, scope = %request.scope, %category, "bound shared parameter");
    Ok(binding)
}

/// @acp:summary "First schedule field that uses one of the names"
///
/// Returns `(parameter, schedule)`.
pub fn find_schedule_usage<D: Document + ?Sized>(
    doc: &D,
    names: &BTreeSet<String>,
) -> Option<(String, String)> {
    doc.schedules().iter().find_map(|schedule| {
        schedule
            .fields
            .iter()
            .find(|field| names.contains(field.as_str()))
            .map(|field| (field.clone(), schedule.name.clone()))
    })
}

/// @acp:summary "Outcome of a binding removal run"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    /// Bindings removed, in removal order
    pub removed: Vec<String>,
    /// Requested names that had no binding
    pub not_bound: Vec<String>,
}

/// @acp:summary "Remove bindings one transaction at a time"
///
/// Each removal commits on its own; `delay` separates successive
/// transactions. A failure rolls back the current removal and stops,
/// leaving earlier removals committed.
pub fn remove_bindings<D: Document + ?Sized>(
    doc: &mut D,
    names: &BTreeSet<String>,
    delay: Duration,
) -> Result<RemovalReport> {
    if let Some((parameter, schedule)) = find_schedule_usage(&*doc, names) {
        return Err(ParamError::UsedInSchedule {
            parameter,
            schedule,
        });
    }

    let bound: Vec<String> = doc
        .bindings()
        .into_iter()
        .map(|b| b.name().to_string())
        .filter(|name| names.contains(name))
        .collect();

    let mut report = RemovalReport {
        not_bound: names
            .iter()
            .filter(|n| !bound.contains(n))
            .cloned()
            .collect(),
        ..Default::default()
    };

    for (index, name) in bound.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }
        let mut tx = Transaction::start(doc, &format!("Delete Parameter Binding: {}", name))?;
        if tx.remove_binding(name)? {
            report.removed.push(name.clone());
        } else {
            warn!(name = %name, "binding disappeared before removal");
        }
        tx.commit()?;
        debug!(name = %name, "binding removed");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryDocument;
    use crate::model::{Element, Schedule};

    const WALLS: ElementId = ElementId(-2000011);

    fn request(name: &str) -> NewParameter {
        NewParameter {
            name: name.into(),
            discipline: Discipline::Common,
            spec: SpecType::Text,
            group: "Data".into(),
            scope: Scope::Instance,
        }
    }

    fn doc_with_bindings(names: &[&str]) -> MemoryDocument {
        let mut doc = MemoryDocument::new("t");
        doc.insert_element(Element::new(ElementId(1)).in_category(WALLS, "Walls"));
        let mut defs = DefinitionFile::empty("shared.txt");
        doc.begin_transaction("bind").unwrap();
        for name in names {
            bind_definition(&mut doc, WALLS, &mut defs, "Scripted", &request(name)).unwrap();
        }
        doc.commit_transaction().unwrap();
        doc
    }

    #[test]
    fn test_bind_rejects_empty_name() {
        let mut doc = MemoryDocument::new("t");
        let mut defs = DefinitionFile::empty("shared.txt");
        doc.begin_transaction("bind").unwrap();
        assert!(matches!(
            bind_definition(&mut doc, WALLS, &mut defs, "Scripted", &request("  ")),
            Err(ParamError::EmptyName)
        ));
    }

    #[test]
    fn test_bind_reuses_definition() {
        let mut doc = MemoryDocument::new("t");
        let mut defs = DefinitionFile::empty("shared.txt");
        doc.begin_transaction("bind").unwrap();
        let first = bind_definition(&mut doc, WALLS, &mut defs, "Scripted", &request("Mark2")).unwrap();
        let second = bind_definition(&mut doc, WALLS, &mut defs, "Scripted", &request("Mark2")).unwrap();
        assert_eq!(first.definition.guid, second.definition.guid);
        assert_eq!(defs.definitions().len(), 1);
    }

    #[test]
    fn test_remove_blocked_by_schedule() {
        let mut doc = doc_with_bindings(&["Fire Rating"]);
        doc.add_schedule(Schedule {
            name: "Wall Schedule".into(),
            fields: vec!["Type".into(), "Fire Rating".into()],
        });

        let names: BTreeSet<String> = ["Fire Rating".to_string()].into();
        let err = remove_bindings(&mut doc, &names, Duration::ZERO).unwrap_err();
        assert!(matches!(
            err,
            ParamError::UsedInSchedule { ref schedule, .. } if schedule == "Wall Schedule"
        ));
        assert_eq!(doc.bindings().len(), 1);
    }

    #[test]
    fn test_remove_reports_unbound_names() {
        let mut doc = doc_with_bindings(&["A", "B"]);
        let names: BTreeSet<String> = ["A".to_string(), "Z".to_string()].into();

        let report = remove_bindings(&mut doc, &names, Duration::ZERO).unwrap();
        assert_eq!(report.removed, vec!["A".to_string()]);
        assert_eq!(report.not_bound, vec!["Z".to_string()]);
        assert_eq!(doc.bindings().len(), 1);
        assert!(!doc.in_transaction());
    }
}
