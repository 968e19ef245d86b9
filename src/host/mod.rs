//! @acp:module "Host Document"
//! @acp:summary "Document trait the engine drives, plus the scoped transaction guard"
//! @acp:domain host
//! @acp:layer service
//!
//! # Host Document
//!
//! Everything the engine needs from the host application goes through
//! [`Document`]: element lookup and enumeration, the selection, parameter
//! writes, bindings, schedules and transactions. Writes are only legal
//! inside a transaction; [`Transaction`] guarantees that a started
//! transaction is either committed or rolled back on every exit path.
//!
//! [`MemoryDocument`] is the serializable implementation used by the CLI
//! and the tests.

pub mod memory;
pub mod transaction;

pub use memory::MemoryDocument;
pub use transaction::{run_in_transaction, Transaction};

use crate::error::Result;
use crate::model::{Element, ElementId, ParameterBinding, Schedule, Value};

/// @acp:summary "Host document/transaction/selection API"
pub trait Document {
    /// Look up one element
    fn element(&self, id: ElementId) -> Option<&Element>;

    /// All elements, instances and types, in document order
    fn elements(&self) -> Vec<&Element>;

    /// Currently selected element ids
    fn selection(&self) -> Vec<ElementId>;

    /// Write a value to a parameter of an element.
    ///
    /// Fails outside a transaction, for unknown elements or parameters,
    /// read-only parameters and values of the wrong storage kind.
    fn set_value(&mut self, element: ElementId, name: &str, value: Value) -> Result<()>;

    /// Existing parameter bindings
    fn bindings(&self) -> Vec<&ParameterBinding>;

    /// Bind a definition to a category; bound elements gain an unset parameter
    fn bind(&mut self, binding: &ParameterBinding) -> Result<()>;

    /// Remove the named binding and its parameters; `false` when not bound
    fn remove_binding(&mut self, name: &str) -> Result<bool>;

    /// Schedules in the document
    fn schedules(&self) -> &[Schedule];

    fn begin_transaction(&mut self, name: &str) -> Result<()>;

    fn commit_transaction(&mut self) -> Result<()>;

    fn rollback_transaction(&mut self) -> Result<()>;

    fn in_transaction(&self) -> bool;
}
