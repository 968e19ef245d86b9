//! @acp:module "Errors"
//! @acp:summary "Library error type and result alias"
//! @acp:domain core
//! @acp:layer utility

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{ElementId, StorageKind};

/// @acp:summary "All failures surfaced by the parameter engine"
#[derive(Debug, Error)]
pub enum ParamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet read error: {0}")]
    SpreadsheetRead(#[from] calamine::Error),

    #[error("Spreadsheet write error: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    #[error("Parameter '{name}' not found on element {element}")]
    ParameterNotFound { element: ElementId, name: String },

    #[error("Parameter '{0}' is read-only")]
    ReadOnly(String),

    #[error("Parameter '{name}' stores {expected}, got a {actual} value")]
    KindMismatch {
        name: String,
        expected: StorageKind,
        actual: StorageKind,
    },

    #[error("Write to '{name}' on element {element} failed: {reason}")]
    WriteFailed {
        element: ElementId,
        name: String,
        reason: String,
    },

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Sheet not found in workbook: {0}")]
    SheetNotFound(String),

    #[error("Column not found in header row: {0}")]
    ColumnNotFound(String),

    #[error("Unsupported workbook format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Definition file error: {0}")]
    DefinitionFile(String),

    #[error("Element {0} has no category")]
    NoCategory(ElementId),

    #[error("Parameter name cannot be empty")]
    EmptyName,

    #[error("Parameter '{parameter}' is used in schedule '{schedule}'")]
    UsedInSchedule { parameter: String, schedule: String },

    #[error("Nothing selected: {0}")]
    NothingSelected(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ParamError>;
