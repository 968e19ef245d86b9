//! @acp:module "Typed Values"
//! @acp:summary "Storage kinds, element ids and the tagged value variant"
//! @acp:domain core
//! @acp:layer model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Host element identifier. `-1` is the invalid id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub i64);

impl ElementId {
    pub const INVALID: ElementId = ElementId(-1);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ElementId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(ElementId)
            .map_err(|_| format!("Invalid element id: '{}'", s))
    }
}

/// @acp:summary "How a parameter stores its value"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Text,
    Integer,
    Boolean,
    Number,
    Reference,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Reference => "reference",
        }
    }

    /// Label shown in the "Type/CD" column when no spec type is known
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Integer => "Integer",
            Self::Boolean => "Yes/No",
            Self::Number => "Number",
            Self::Reference => "ElementId",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// @acp:summary "A parameter value, one variant per storage kind"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Value {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Number(f64),
    Reference(ElementId),
}

impl Value {
    pub fn kind(&self) -> StorageKind {
        match self {
            Self::Text(_) => StorageKind::Text,
            Self::Integer(_) => StorageKind::Integer,
            Self::Boolean(_) => StorageKind::Boolean,
            Self::Number(_) => StorageKind::Number,
            Self::Reference(_) => StorageKind::Reference,
        }
    }

    /// Raw rendering without any host formatting
    pub fn raw(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Reference(id) => id.to_string(),
        }
    }
}
