//! @acp:module "Elements"
//! @acp:summary "Host elements, their parameters, bindings and schedules"
//! @acp:domain core
//! @acp:layer model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::{Discipline, ParameterOrigin, Scope, SpecType, DEFAULT_GROUP};
use super::value::{ElementId, StorageKind, Value};
use crate::definitions::ExternalDefinition;

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

/// @acp:summary "Element category (walls, doors, ...)"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: ElementId,
    pub name: String,
}

/// @acp:summary "One named parameter as the host stores it"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    pub storage: StorageKind,

    /// `None` is the unset/default state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub origin: ParameterOrigin,

    #[serde(default = "default_group")]
    pub group: String,

    #[serde(default)]
    pub discipline: Discipline,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<SpecType>,

    /// Display unit appended to formatted numbers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Enumeration labels for integer parameters
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<i64, String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, storage: StorageKind) -> Self {
        Self {
            name: name.into(),
            storage,
            value: None,
            read_only: false,
            origin: ParameterOrigin::BuiltIn,
            group: default_group(),
            discipline: Discipline::Common,
            spec: None,
            unit: None,
            labels: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn with_origin(mut self, origin: ParameterOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_label(mut self, value: i64, label: impl Into<String>) -> Self {
        self.labels.insert(value, label.into());
        self
    }

    /// Host-formatted value string, when the host would produce one
    pub fn value_string(&self) -> Option<String> {
        match self.value.as_ref()? {
            Value::Integer(i) => self.labels.get(i).cloned(),
            Value::Boolean(b) => Some(if *b { "Yes" } else { "No" }.to_string()),
            Value::Number(n) => self.unit.as_ref().map(|u| format!("{} {}", n, u)),
            Value::Text(_) | Value::Reference(_) => None,
        }
    }

    /// Whether the parameter carries data an import must not overwrite
    pub fn has_value(&self) -> bool {
        match &self.value {
            None => false,
            Some(Value::Text(s)) => !s.trim().is_empty(),
            Some(Value::Reference(id)) => id.is_valid(),
            Some(_) => true,
        }
    }

    /// Type column label: the definition's spec label, else the storage label
    pub fn type_label(&self) -> &'static str {
        self.spec
            .map(|s| s.label())
            .unwrap_or_else(|| self.storage.type_label())
    }
}

/// @acp:summary "A model element, either an instance or a type"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<ElementId>,

    #[serde(default)]
    pub is_type: bool,

    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl Element {
    pub fn new(id: ElementId) -> Self {
        Self {
            id,
            name: None,
            category: None,
            type_id: None,
            is_type: false,
            parameters: Vec::new(),
        }
    }

    pub fn type_element(id: ElementId) -> Self {
        Self {
            is_type: true,
            ..Self::new(id)
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn in_category(mut self, id: ElementId, name: impl Into<String>) -> Self {
        self.category = Some(Category {
            id,
            name: name.into(),
        });
        self
    }

    pub fn of_type(mut self, type_id: ElementId) -> Self {
        self.type_id = Some(type_id);
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// First parameter with this exact name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }

    /// Element name, falling back to a text "Name" parameter
    pub fn display_name(&self) -> Option<&str> {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return Some(name);
        }
        match self.parameter("Name")?.value.as_ref()? {
            Value::Text(s) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn category_id(&self) -> Option<ElementId> {
        self.category.as_ref().map(|c| c.id)
    }
}

/// @acp:summary "A definition bound to a category as instance or type parameter"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterBinding {
    pub definition: ExternalDefinition,
    pub scope: Scope,
    pub category: ElementId,
    #[serde(default = "default_group")]
    pub group: String,
    #[serde(default)]
    pub discipline: Discipline,
}

impl ParameterBinding {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Fresh, unset parameter materialized on bound elements
    pub fn materialize(&self) -> Parameter {
        Parameter {
            name: self.definition.name.clone(),
            storage: self.definition.spec.storage(),
            value: None,
            read_only: false,
            origin: ParameterOrigin::Shared,
            group: self.group.clone(),
            discipline: self.discipline,
            spec: Some(self.definition.spec),
            unit: None,
            labels: BTreeMap::new(),
        }
    }
}

/// @acp:summary "A schedule view and the parameter fields it shows"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_string_per_kind() {
        let p = Parameter::new("Function", StorageKind::Integer)
            .with_label(1, "Exterior")
            .with_value(Value::Integer(1));
        assert_eq!(p.value_string().as_deref(), Some("Exterior"));

        let p = Parameter::new("Width", StorageKind::Number)
            .with_unit("mm")
            .with_value(Value::Number(200.0));
        assert_eq!(p.value_string().as_deref(), Some("200 mm"));

        let p = Parameter::new("Count", StorageKind::Integer).with_value(Value::Integer(4));
        assert_eq!(p.value_string(), None);
    }

    #[test]
    fn test_has_value() {
        assert!(!Parameter::new("A", StorageKind::Text).has_value());
        assert!(!Parameter::new("A", StorageKind::Text)
            .with_value(Value::Text("  ".into()))
            .has_value());
        assert!(!Parameter::new("R", StorageKind::Reference)
            .with_value(Value::Reference(ElementId::INVALID))
            .has_value());
        assert!(Parameter::new("N", StorageKind::Number)
            .with_value(Value::Number(0.0))
            .has_value());
    }

    #[test]
    fn test_display_name_falls_back_to_name_parameter() {
        let e = Element::new(ElementId(5))
            .with_parameter(Parameter::new("Name", StorageKind::Text).with_value(Value::Text("Level 1".into())));
        assert_eq!(e.display_name(), Some("Level 1"));
        assert_eq!(Element::new(ElementId(6)).display_name(), None);
    }
}
