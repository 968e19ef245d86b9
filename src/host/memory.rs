//! @acp:module "Memory Document"
//! @acp:summary "Serializable in-memory host document with snapshot transactions"
//! @acp:domain host
//! @acp:layer storage

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Document;
use crate::error::{ParamError, Result};
use crate::model::{Element, ElementId, ParameterBinding, Schedule, Scope, Value};

/// State captured when a transaction starts
#[derive(Debug, Clone)]
struct Snapshot {
    name: String,
    elements: Vec<Element>,
    bindings: Vec<ParameterBinding>,
}

/// @acp:summary "Host document kept in memory and persisted as JSON"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryDocument {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    elements: Vec<Element>,

    #[serde(default)]
    bindings: Vec<ParameterBinding>,

    #[serde(default)]
    schedules: Vec<Schedule>,

    #[serde(default)]
    selection: Vec<ElementId>,

    #[serde(skip)]
    open: Option<Snapshot>,

    #[serde(skip)]
    write_faults: BTreeSet<ElementId>,
}

impl MemoryDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// @acp:summary "Load a model file"
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// @acp:summary "Save the model file"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if self.open.is_some() {
            return Err(ParamError::Transaction(
                "cannot save while a transaction is open".into(),
            ));
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Add or replace an element
    pub fn insert_element(&mut self, element: Element) {
        match self.elements.iter_mut().find(|e| e.id == element.id) {
            Some(existing) => *existing = element,
            None => self.elements.push(element),
        }
    }

    pub fn add_schedule(&mut self, schedule: Schedule) {
        self.schedules.push(schedule);
    }

    pub fn select(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        self.selection = ids.into_iter().collect();
    }

    /// Make every later write to this element fail, as a host error would
    pub fn inject_write_fault(&mut self, id: ElementId) {
        self.write_faults.insert(id);
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    fn require_transaction(&self, operation: &str) -> Result<()> {
        if self.open.is_none() {
            return Err(ParamError::Transaction(format!(
                "{} attempted outside a transaction",
                operation
            )));
        }
        Ok(())
    }
}

impl Document for MemoryDocument {
    fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn elements(&self) -> Vec<&Element> {
        self.elements.iter().collect()
    }

    fn selection(&self) -> Vec<ElementId> {
        self.selection.clone()
    }

    fn set_value(&mut self, element: ElementId, name: &str, value: Value) -> Result<()> {
        self.require_transaction("parameter write")?;
        if self.write_faults.contains(&element) {
            return Err(ParamError::WriteFailed {
                element,
                name: name.to_string(),
                reason: "host rejected the write".into(),
            });
        }

        let target = self
            .element_mut(element)
            .ok_or(ParamError::ElementNotFound(element))?;
        let parameter = target
            .parameter_mut(name)
            .ok_or_else(|| ParamError::ParameterNotFound {
                element,
                name: name.to_string(),
            })?;

        if parameter.read_only {
            return Err(ParamError::ReadOnly(name.to_string()));
        }
        if parameter.storage != value.kind() {
            return Err(ParamError::KindMismatch {
                name: name.to_string(),
                expected: parameter.storage,
                actual: value.kind(),
            });
        }

        debug!(%element, name, value = %value.raw(), "set parameter");
        parameter.value = Some(value);
        Ok(())
    }

    fn bindings(&self) -> Vec<&ParameterBinding> {
        self.bindings.iter().collect()
    }

    fn bind(&mut self, binding: &ParameterBinding) -> Result<()> {
        self.require_transaction("parameter binding")?;

        let wants_types = binding.scope == Scope::Type;
        let mut bound = 0usize;
        for element in self.elements.iter_mut() {
            if element.is_type != wants_types || element.category_id() != Some(binding.category) {
                continue;
            }
            if element.parameter(binding.name()).is_none() {
                element.parameters.push(binding.materialize());
                bound += 1;
            }
        }

        if !self.bindings.iter().any(|b| b.name() == binding.name()) {
            self.bindings.push(binding.clone());
        }
        debug!(name = binding.name(), scope = %binding.scope, elements = bound, "bound parameter");
        Ok(())
    }

    fn remove_binding(&mut self, name: &str) -> Result<bool> {
        self.require_transaction("binding removal")?;

        let before = self.bindings.len();
        self.bindings.retain(|b| b.name() != name);
        if self.bindings.len() == before {
            return Ok(false);
        }
        for element in self.elements.iter_mut() {
            element
                .parameters
                .retain(|p| !(p.name == name && p.origin.is_bound()));
        }
        Ok(true)
    }

    fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    fn begin_transaction(&mut self, name: &str) -> Result<()> {
        if let Some(open) = &self.open {
            return Err(ParamError::Transaction(format!(
                "'{}' cannot start while '{}' is open",
                name, open.name
            )));
        }
        self.open = Some(Snapshot {
            name: name.to_string(),
            elements: self.elements.clone(),
            bindings: self.bindings.clone(),
        });
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        self.open
            .take()
            .map(|_| ())
            .ok_or_else(|| ParamError::Transaction("no open transaction to commit".into()))
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        let snapshot = self
            .open
            .take()
            .ok_or_else(|| ParamError::Transaction("no open transaction to roll back".into()))?;
        self.elements = snapshot.elements;
        self.bindings = snapshot.bindings;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.open.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::ExternalDefinition;
    use crate::model::{Discipline, Parameter, SpecType, StorageKind};

    fn wall(id: i64) -> Element {
        Element::new(ElementId(id))
            .in_category(ElementId(-2000011), "Walls")
            .of_type(ElementId(100))
            .with_parameter(Parameter::new("Comments", StorageKind::Text))
            .with_parameter(Parameter::new("Area", StorageKind::Number).read_only())
    }

    fn binding(scope: Scope) -> ParameterBinding {
        ParameterBinding {
            definition: ExternalDefinition {
                guid: uuid::Uuid::new_v4(),
                name: "Fire Rating".into(),
                spec: SpecType::Text,
                group_id: 1,
                visible: true,
                description: String::new(),
            },
            scope,
            category: ElementId(-2000011),
            group: "Identity Data".into(),
            discipline: Discipline::Common,
        }
    }

    #[test]
    fn test_write_requires_transaction() {
        let mut doc = MemoryDocument::new("t");
        doc.insert_element(wall(1));
        let err = doc
            .set_value(ElementId(1), "Comments", Value::Text("x".into()))
            .unwrap_err();
        assert!(matches!(err, ParamError::Transaction(_)));
    }

    #[test]
    fn test_write_checks_read_only_and_kind() {
        let mut doc = MemoryDocument::new("t");
        doc.insert_element(wall(1));
        doc.begin_transaction("t").unwrap();

        assert!(matches!(
            doc.set_value(ElementId(1), "Area", Value::Number(1.0)),
            Err(ParamError::ReadOnly(_))
        ));
        assert!(matches!(
            doc.set_value(ElementId(1), "Comments", Value::Integer(1)),
            Err(ParamError::KindMismatch { .. })
        ));
        assert!(matches!(
            doc.set_value(ElementId(1), "Missing", Value::Integer(1)),
            Err(ParamError::ParameterNotFound { .. })
        ));
    }

    #[test]
    fn test_nested_transaction_rejected() {
        let mut doc = MemoryDocument::new("t");
        doc.begin_transaction("outer").unwrap();
        assert!(doc.begin_transaction("inner").is_err());
    }

    #[test]
    fn test_bind_instance_and_type() {
        let mut doc = MemoryDocument::new("t");
        doc.insert_element(wall(1));
        doc.insert_element(
            Element::type_element(ElementId(100)).in_category(ElementId(-2000011), "Walls"),
        );
        doc.begin_transaction("bind").unwrap();
        doc.bind(&binding(Scope::Type)).unwrap();
        doc.commit_transaction().unwrap();

        let ty = doc.element(ElementId(100)).unwrap();
        let bound = ty.parameter("Fire Rating").unwrap();
        assert_eq!(bound.origin, crate::model::ParameterOrigin::Shared);
        assert_eq!(bound.group, "Identity Data");
        assert!(doc.element(ElementId(1)).unwrap().parameter("Fire Rating").is_none());
        assert_eq!(doc.bindings().len(), 1);
    }

    #[test]
    fn test_remove_binding_strips_parameters() {
        let mut doc = MemoryDocument::new("t");
        doc.insert_element(wall(1));
        doc.begin_transaction("bind").unwrap();
        doc.bind(&binding(Scope::Instance)).unwrap();
        assert!(doc.remove_binding("Fire Rating").unwrap());
        assert!(!doc.remove_binding("Fire Rating").unwrap());
        doc.commit_transaction().unwrap();

        assert!(doc.element(ElementId(1)).unwrap().parameter("Fire Rating").is_none());
        assert!(doc.bindings().is_empty());
    }

    #[test]
    fn test_model_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let mut doc = MemoryDocument::new("Tower");
        doc.insert_element(wall(1));
        doc.select([ElementId(1)]);
        doc.save(&path).unwrap();

        let loaded = MemoryDocument::load(&path).unwrap();
        assert_eq!(loaded.title, "Tower");
        assert_eq!(loaded.selection(), vec![ElementId(1)]);
        assert_eq!(loaded.element(ElementId(1)), doc.element(ElementId(1)));
    }
}
