//! @acp:module "Tabular Bridge"
//! @acp:summary "Exports records to a spreadsheet and merges them back without overwriting"
//! @acp:domain tabular
//! @acp:layer service
//!
//! # Tabular Import/Export
//!
//! Export writes one row per selected record under a fixed header schema.
//! Import locates the same sheet, maps headers back to columns by
//! case-insensitive substring match, and reconciles row by row:
//!
//! - parameter present with a value: skipped, existing data wins
//! - parameter present but empty: value coerced and written
//! - parameter missing: definition created or reused, bound, then written
//!
//! All writes of one import share a transaction; re-importing an unchanged
//! sheet is a no-op.

pub mod workbook;

pub use workbook::{read_sheet, write_sheet, WorkbookFormat};

use std::path::Path;

use tracing::{debug, info, warn};

use crate::binding::{bind_definition, NewParameter};
use crate::coerce::coerce;
use crate::definitions::LazyDefinitionFile;
use crate::error::{ParamError, Result};
use crate::host::{Document, Transaction};
use crate::model::{group_label, Discipline, Element, Scope, SpecType};
use crate::view::{resolve_parameter, ElementContext, ParameterRecord};

/// Characters a sheet name may not contain
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// @acp:summary "Spreadsheet columns, in export order"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    Kind,
    Discipline,
    TypeLabel,
    Group,
    Scope,
    Value,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Self::Name,
        Self::Kind,
        Self::Discipline,
        Self::TypeLabel,
        Self::Group,
        Self::Scope,
        Self::Value,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Self::Name => "Parameter Name",
            Self::Kind => "Type of Parameter",
            Self::Discipline => "Discipline",
            Self::TypeLabel => "Type/CD",
            Self::Group => "Group Under",
            Self::Scope => "Instance/Type",
            Self::Value => "Value",
        }
    }
}

/// Header row written on export
pub fn headers() -> Vec<&'static str> {
    Column::ALL.iter().map(Column::header).collect()
}

/// @acp:summary "Column positions recovered from a header row"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    positions: [Option<usize>; 7],
}

impl HeaderMap {
    /// A column maps to the first header containing its canonical text,
    /// compared case-insensitively.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let lowered: Vec<String> = headers.iter().map(|h| h.as_ref().to_lowercase()).collect();
        let mut map = Self::default();
        for (slot, column) in Column::ALL.iter().enumerate() {
            let needle = column.header().to_lowercase();
            map.positions[slot] = lowered.iter().position(|h| h.contains(&needle));
        }
        map
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        Column::ALL
            .iter()
            .position(|c| *c == column)
            .and_then(|slot| self.positions[slot])
    }

    fn cell<'a>(&self, row: &'a [String], column: Column) -> &'a str {
        self.position(column)
            .and_then(|i| row.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// @acp:summary "Sheet name for an element"
///
/// Element name, else `<category>_<id>`, else "Element"; characters a sheet
/// name may not hold become `_`, then the result is cut to `limit` chars.
/// Sheet names are never empty, so a limit of 0 counts as 1.
pub fn sheet_name(element: &Element, limit: usize) -> String {
    let limit = limit.max(1);
    let raw = match (element.display_name(), &element.category) {
        (Some(name), _) => name.to_string(),
        (None, Some(category)) => format!("{}_{}", category.name, element.id),
        (None, None) => "Element".to_string(),
    };
    let cleaned: String = raw
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(limit)
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    if cleaned.is_empty() {
        "Element".chars().take(limit).collect()
    } else {
        cleaned.to_string()
    }
}

/// Cells of one exported row, in [`Column::ALL`] order
pub fn export_row(record: &ParameterRecord) -> Vec<String> {
    vec![
        record.name.clone(),
        record.origin.label().to_string(),
        record.discipline.label().to_string(),
        record.type_label.clone(),
        record.group.clone(),
        record.scope.label().to_string(),
        record.value.clone(),
    ]
}

/// @acp:summary "Export selected records to a workbook sheet"
///
/// Returns the number of data rows written.
pub fn export_records<'a>(
    path: &Path,
    sheet: &str,
    records: impl IntoIterator<Item = &'a ParameterRecord>,
) -> Result<usize> {
    let rows: Vec<Vec<String>> = records
        .into_iter()
        .filter(|r| r.selected)
        .map(export_row)
        .collect();
    if rows.is_empty() {
        return Err(ParamError::NothingSelected(
            "no parameters selected for export".into(),
        ));
    }
    write_sheet(path, sheet, &headers(), &rows)?;
    info!(path = %path.display(), sheet, rows = rows.len(), "exported parameters");
    Ok(rows.len())
}

/// @acp:summary "One data row read back from a workbook"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    pub name: String,
    pub kind: String,
    pub discipline: String,
    pub type_label: String,
    pub group: String,
    pub scope: String,
    pub value: String,
}

impl ImportRow {
    /// Binding request for a parameter the element does not have yet
    pub fn new_parameter(&self) -> NewParameter {
        NewParameter {
            name: self.name.trim().to_string(),
            discipline: Discipline::from_label(&self.discipline),
            spec: SpecType::from_label(&self.type_label),
            group: group_label(&self.group).to_string(),
            scope: Scope::from_label(&self.scope),
        }
    }
}

/// @acp:summary "Turn a raw sheet grid into import rows"
///
/// The first row is the header. Reading stops at the first row whose first
/// cell is empty.
pub fn parse_rows(grid: &[Vec<String>]) -> Result<Vec<ImportRow>> {
    let Some((header, data)) = grid.split_first() else {
        return Err(ParamError::ColumnNotFound(Column::Name.header().into()));
    };
    let map = HeaderMap::from_headers(header);
    if map.position(Column::Name).is_none() {
        return Err(ParamError::ColumnNotFound(Column::Name.header().into()));
    }
    debug!(headers = ?header, "mapped header row");

    let rows = data
        .iter()
        .take_while(|row| row.first().is_some_and(|c| !c.trim().is_empty()))
        .map(|row| ImportRow {
            name: map.cell(row, Column::Name).trim().to_string(),
            kind: map.cell(row, Column::Kind).to_string(),
            discipline: map.cell(row, Column::Discipline).to_string(),
            type_label: map.cell(row, Column::TypeLabel).to_string(),
            group: map.cell(row, Column::Group).to_string(),
            scope: map.cell(row, Column::Scope).to_string(),
            value: map.cell(row, Column::Value).to_string(),
        })
        .collect();
    Ok(rows)
}

/// @acp:summary "Counters reported after a committed import"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Empty parameters that received a value
    pub updated: usize,
    /// Parameters created and bound
    pub added: usize,
    /// Rows skipped because the parameter already had a value
    pub skipped: usize,
    /// Rows whose value could not be coerced or written
    pub ignored: usize,
    /// Rows skipped because the parameter could not be resolved or bound
    pub unresolved: usize,
}

/// @acp:summary "Reconcile import rows against the element in one transaction"
///
/// The definition file is opened at most once, on the first row that needs
/// a new binding, and saved only after the transaction commits.
pub fn import_rows<D: Document + ?Sized>(
    doc: &mut D,
    context: &ElementContext,
    rows: &[ImportRow],
    definitions: &mut LazyDefinitionFile,
    definition_group: &str,
) -> Result<ImportReport> {
    let category = doc
        .element(context.element)
        .ok_or(ParamError::ElementNotFound(context.element))?
        .category_id();

    let mut report = ImportReport::default();
    let mut tx = Transaction::start(doc, "Import Parameters")?;

    for row in rows {
        let existing = resolve_parameter(&*tx, context, &row.name)
            .map(|(scope, p)| (scope, p.storage, p.has_value(), p.read_only));

        match existing {
            Some((_, _, true, _)) => {
                debug!(name = %row.name, "already set; skipped");
                report.skipped += 1;
            }
            Some((_, _, false, true)) => {
                warn!(name = %row.name, "parameter is read-only; skipped");
                report.ignored += 1;
            }
            Some((scope, storage, false, false)) => {
                let Some(target) = context.source(scope) else {
                    report.unresolved += 1;
                    continue;
                };
                match coerce(storage, &row.value) {
                    Some(value) => {
                        tx.set_value(target, &row.name, value)?;
                        report.updated += 1;
                    }
                    None => report.ignored += 1,
                }
            }
            None => {
                let Some(category) = category else {
                    warn!(name = %row.name, element = %context.element, "element has no category; cannot bind");
                    report.unresolved += 1;
                    continue;
                };
                let request = row.new_parameter();
                if request.name.is_empty() {
                    report.unresolved += 1;
                    continue;
                }
                let file = definitions.get()?;
                bind_definition(&mut *tx, category, file, definition_group, &request)?;
                report.added += 1;

                let bound = resolve_parameter(&*tx, context, &request.name)
                    .map(|(scope, p)| (scope, p.storage));
                match bound.and_then(|(scope, storage)| Some((context.source(scope)?, storage))) {
                    Some((target, storage)) => {
                        if let Some(value) = coerce(storage, &row.value) {
                            tx.set_value(target, &request.name, value)?;
                        }
                    }
                    None => {
                        warn!(name = %request.name, "bound parameter not visible on element; value not set");
                    }
                }
            }
        }
    }

    tx.commit()?;
    info!(
        updated = report.updated,
        added = report.added,
        skipped = report.skipped,
        "imported parameters"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementId, Parameter, StorageKind, Value};

    #[test]
    fn test_header_map_tolerates_drift() {
        let map = HeaderMap::from_headers(&[
            "VALUE (edited)",
            "parameter name",
            "Group Under",
            "Instance/Type binding",
        ]);
        assert_eq!(map.position(Column::Name), Some(1));
        assert_eq!(map.position(Column::Value), Some(0));
        assert_eq!(map.position(Column::Scope), Some(3));
        assert_eq!(map.position(Column::Discipline), None);
    }

    #[test]
    fn test_sheet_name_rules() {
        let named = Element::new(ElementId(1)).named("Door: 900 x 2100 [Fire Rated] Single Flush");
        let name = sheet_name(&named, 31);
        assert_eq!(name.chars().count(), 31);
        assert!(!name.contains(':') && !name.contains('['));

        let unnamed = Element::new(ElementId(7)).in_category(ElementId(-1), "Walls");
        assert_eq!(sheet_name(&unnamed, 31), "Walls_7");
        assert_eq!(sheet_name(&Element::new(ElementId(8)), 31), "Element");
    }

    #[test]
    fn test_sheet_name_never_exceeds_small_limit() {
        let unnamed = Element::new(ElementId(8));
        assert_eq!(sheet_name(&unnamed, 3), "Ele");
        assert_eq!(sheet_name(&unnamed, 0), "E");
        assert_eq!(sheet_name(&Element::new(ElementId(9)).named("'quoted'"), 1), "E");
    }

    #[test]
    fn test_parse_rows_stops_at_blank_name() {
        let grid = vec![
            headers().iter().map(|h| h.to_string()).collect::<Vec<_>>(),
            vec!["Mark".into(), "".into(), "".into(), "Text".into(), "".into(), "Instance".into(), "D1".into()],
            vec!["".into(), "".into(), "".into(), "".into(), "".into(), "".into(), "orphan".into()],
            vec!["Later".into()],
        ];
        let rows = parse_rows(&grid).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Mark");
        assert_eq!(rows[0].value, "D1");
    }

    #[test]
    fn test_parse_rows_requires_name_column() {
        let grid = vec![vec!["Value".to_string()], vec!["x".to_string()]];
        assert!(matches!(parse_rows(&grid), Err(ParamError::ColumnNotFound(_))));
    }

    #[test]
    fn test_export_row_order() {
        let p = Parameter::new("Mark", StorageKind::Text).with_value(Value::Text("A".into()));
        let record = ParameterRecord {
            name: p.name.clone(),
            storage: p.storage,
            origin: p.origin,
            discipline: p.discipline,
            type_label: p.type_label().into(),
            group: p.group.clone(),
            scope: Scope::Instance,
            editable: true,
            value: "A".into(),
            stored: p.value.clone(),
            selected: true,
        };
        assert_eq!(
            export_row(&record),
            ["Mark", "Built-in Parameter", "Common", "Text", "Other", "Instance", "A"]
        );
    }

    #[test]
    fn test_new_parameter_from_row() {
        let row = ImportRow {
            name: " Fire Rating ".into(),
            discipline: "Structural".into(),
            type_label: "Yes/No".into(),
            group: "identity data".into(),
            scope: "Type".into(),
            ..Default::default()
        };
        let request = row.new_parameter();
        assert_eq!(request.name, "Fire Rating");
        assert_eq!(request.spec, SpecType::YesNo);
        assert_eq!(request.group, "Identity Data");
        assert_eq!(request.scope, Scope::Type);
        assert_eq!(request.discipline, Discipline::Structural);
    }
}
