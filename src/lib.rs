#![forbid(unsafe_code)]

//! @acp:module "Paramgr Library"
//! @acp:summary "Typed parameter reconciliation for elements of a CAD document"
//! @acp:domain core
//! @acp:layer api
//! @acp:stability experimental
//!
//! # paramgr
//!
//! Reads the parameters of an element (and its type) into a flat, editable
//! record set, writes edits back with the right storage kind, propagates
//! them to similar elements, and round-trips records through a workbook.
//!
//! ## Features
//!
//! - **Typed coercion**: free text to text, integer, yes/no, number or reference
//! - **Transactional writes**: every batch commits as a whole or rolls back
//! - **Idempotent import**: values already set are never overwritten
//! - **Shared parameters**: create, bind and remove category bindings
//!
//! ## Example
//!
//! ```rust,no_run
//! use paramgr::{Config, MemoryDocument, ParameterSession};
//!
//! fn main() -> anyhow::Result<()> {
//!     let document = MemoryDocument::load("model.json")?;
//!     let mut session = ParameterSession::open(document, None, Config::default())?;
//!
//!     session.edit("Comments", "Checked")?;
//!     session.apply(true)?;
//!     session.export("params.xlsx".as_ref())?;
//!
//!     session.into_document().save("model.json")?;
//!     Ok(())
//! }
//! ```

pub mod apply;
pub mod binding;
pub mod coerce;
pub mod commands;
pub mod config;
pub mod definitions;
pub mod error;
pub mod host;
pub mod model;
pub mod session;
pub mod tabular;
pub mod view;

// Re-exports
pub use apply::{
    apply_batch, similar_elements, ApplyOptions, ApplyReport, EditBatch, EditValue, PendingEdit,
};
pub use binding::{bind_definition, remove_bindings, NewParameter, RemovalReport};
pub use coerce::coerce;
pub use config::Config;
pub use definitions::{DefinitionFile, ExternalDefinition, LazyDefinitionFile};
pub use error::{ParamError, Result};
pub use host::{run_in_transaction, Document, MemoryDocument, Transaction};
pub use model::{
    Discipline, Element, ElementId, Parameter, ParameterOrigin, Scope, SpecType, StorageKind,
    Value,
};
pub use session::{ParameterSession, SessionState};
pub use tabular::{ImportReport, ImportRow};
pub use view::{build_records, ElementContext, ParameterRecord, RecordFilter, RecordSet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
