//! @acp:module "Parameter View Model"
//! @acp:summary "Projects an element's raw parameters into deduplicated editable records"
//! @acp:domain core
//! @acp:layer service
//!
//! # Parameter View Model
//!
//! [`build_records`] walks the element's instance parameters and then its
//! type's parameters, keeping the first occurrence of each name. Instance
//! parameters therefore shadow type parameters of the same name.
//!
//! A [`RecordSet`] is an immutable snapshot. Callers replace it wholesale
//! after every write-back instead of patching records in place.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{ParamError, Result};
use crate::host::Document;
use crate::model::{
    Discipline, Element, ElementId, Parameter, ParameterOrigin, Scope, StorageKind, Value,
};

/// @acp:summary "The element under edit and its type element"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementContext {
    pub element: ElementId,
    pub type_element: Option<ElementId>,
}

impl ElementContext {
    /// @acp:summary "Resolve an element and its type from the document"
    pub fn resolve<D: Document + ?Sized>(doc: &D, element: ElementId) -> Result<Self> {
        let base = doc
            .element(element)
            .ok_or(ParamError::ElementNotFound(element))?;
        let type_element = base
            .type_id
            .filter(|id| id.is_valid())
            .filter(|id| doc.element(*id).is_some());
        Ok(Self {
            element,
            type_element,
        })
    }

    /// Element holding parameters of the given scope
    pub fn source(&self, scope: Scope) -> Option<ElementId> {
        match scope {
            Scope::Instance => Some(self.element),
            Scope::Type => self.type_element,
        }
    }
}

/// @acp:summary "Normalized, editable projection of one named parameter"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterRecord {
    pub name: String,
    pub storage: StorageKind,
    pub origin: ParameterOrigin,
    pub discipline: Discipline,
    pub type_label: String,
    pub group: String,
    pub scope: Scope,
    pub editable: bool,
    /// Display text: labels for enumerated integers, names for references
    pub value: String,
    /// Stored value as read from the document
    #[serde(skip)]
    pub stored: Option<Value>,
    pub selected: bool,
}

impl ParameterRecord {
    fn from_parameter<D: Document + ?Sized>(doc: &D, parameter: &Parameter, scope: Scope) -> Self {
        Self {
            name: parameter.name.clone(),
            storage: parameter.storage,
            origin: parameter.origin,
            discipline: parameter.discipline,
            type_label: parameter.type_label().to_string(),
            group: parameter.group.clone(),
            scope,
            editable: !parameter.read_only,
            value: display_value(doc, parameter),
            stored: parameter.value.clone(),
            selected: true,
        }
    }
}

/// @acp:summary "Immutable snapshot of an element's records"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSet {
    element: ElementId,
    records: Vec<ParameterRecord>,
}

impl RecordSet {
    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn get(&self, name: &str) -> Option<&ParameterRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[ParameterRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// @acp:summary "Build the record set for an element context"
pub fn build_records<D: Document + ?Sized>(doc: &D, context: &ElementContext) -> Result<RecordSet> {
    let element = doc
        .element(context.element)
        .ok_or(ParamError::ElementNotFound(context.element))?;
    let type_element = context.type_element.and_then(|id| doc.element(id));

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for (scope, source) in scoped_sources(element, type_element) {
        for parameter in &source.parameters {
            if seen.insert(parameter.name.as_str()) {
                records.push(ParameterRecord::from_parameter(doc, parameter, scope));
            }
        }
    }

    Ok(RecordSet {
        element: context.element,
        records,
    })
}

fn scoped_sources<'a>(
    element: &'a Element,
    type_element: Option<&'a Element>,
) -> impl Iterator<Item = (Scope, &'a Element)> {
    std::iter::once((Scope::Instance, element)).chain(type_element.map(|t| (Scope::Type, t)))
}

/// @acp:summary "Find a parameter the way the record builder would"
///
/// Instance parameters win over type parameters of the same name.
pub fn resolve_parameter<'a, D: Document + ?Sized>(
    doc: &'a D,
    context: &ElementContext,
    name: &str,
) -> Option<(Scope, &'a Parameter)> {
    let element = doc.element(context.element)?;
    let type_element = context.type_element.and_then(|id| doc.element(id));
    scoped_sources(element, type_element)
        .find_map(|(scope, source)| source.parameter(name).map(|p| (scope, p)))
}

/// @acp:summary "Human-readable value for the editor grid"
pub fn display_value<D: Document + ?Sized>(doc: &D, parameter: &Parameter) -> String {
    let Some(value) = &parameter.value else {
        return String::new();
    };
    match value {
        Value::Text(s) => s.clone(),
        Value::Integer(i) => parameter.value_string().unwrap_or_else(|| i.to_string()),
        Value::Boolean(_) => parameter.value_string().unwrap_or_else(|| value.raw()),
        Value::Number(n) => parameter.value_string().unwrap_or_else(|| n.to_string()),
        Value::Reference(id) if !id.is_valid() => String::new(),
        Value::Reference(id) => doc
            .element(*id)
            .and_then(|e| e.display_name())
            .map(str::to_string)
            .or_else(|| parameter.value_string())
            .unwrap_or_else(|| id.to_string()),
    }
}

/// @acp:summary "Search text and editable-only toggle applied to the grid"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub search: String,
    pub editable_only: bool,
}

impl RecordFilter {
    pub fn matches(&self, record: &ParameterRecord) -> bool {
        if self.editable_only && !record.editable {
            return false;
        }
        record
            .name
            .to_lowercase()
            .contains(&self.search.to_lowercase())
    }
}
