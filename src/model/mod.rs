//! @acp:module "Model"
//! @acp:summary "Host-side data model: values, elements, catalogs"
//! @acp:domain core
//! @acp:layer model

pub mod catalog;
pub mod element;
pub mod value;

pub use catalog::{
    group_label, Discipline, ParameterOrigin, Scope, SpecType, DEFAULT_GROUP, GROUP_LABELS,
};
pub use element::{Category, Element, Parameter, ParameterBinding, Schedule};
pub use value::{ElementId, StorageKind, Value};
