//! @acp:module "Workbook IO"
//! @acp:summary "Reads and writes one sheet of an xlsx or csv workbook"
//! @acp:domain tabular
//! @acp:layer storage
//!
//! Workbook handles are owned values scoped to a single call, so they are
//! released on success and on every error path.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use crate::error::{ParamError, Result};

/// @acp:summary "Supported workbook formats, chosen by extension"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    Xlsx,
    Csv,
}

impl WorkbookFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("xlsx") | Some("xlsm") => Ok(Self::Xlsx),
            Some("csv") => Ok(Self::Csv),
            _ => Err(ParamError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// An open xlsx workbook, released when dropped
struct ReadHandle {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl ReadHandle {
    fn open(path: &Path) -> Result<Self> {
        let sheets = open_workbook_auto(path)?;
        debug!(path = %path.display(), "opened workbook");
        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }
}

impl Drop for ReadHandle {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "released workbook");
    }
}

/// @acp:summary "Write a header row (bold) and data rows to one sheet"
pub fn write_sheet(path: &Path, sheet: &str, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    match WorkbookFormat::from_path(path)? {
        WorkbookFormat::Xlsx => write_xlsx(path, sheet, headers, rows),
        WorkbookFormat::Csv => write_csv(path, headers, rows),
    }
}

/// @acp:summary "Read every row of one sheet as text cells"
///
/// CSV files hold a single sheet, so the sheet name is not checked there.
pub fn read_sheet(path: &Path, sheet: &str) -> Result<Vec<Vec<String>>> {
    match WorkbookFormat::from_path(path)? {
        WorkbookFormat::Xlsx => read_xlsx(path, sheet),
        WorkbookFormat::Csv => {
            debug!(sheet, "csv workbook; sheet name not applicable");
            read_csv(path)
        }
    }
}

fn write_xlsx(path: &Path, sheet: &str, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet)?;
        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }
        for (index, row) in rows.iter().enumerate() {
            let row_num = index as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                worksheet.write_string(row_num, col as u16, cell.as_str())?;
            }
        }
        worksheet.autofit();
    }
    workbook.save(path)?;
    Ok(())
}

fn write_csv(path: &Path, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_xlsx(path: &Path, sheet: &str) -> Result<Vec<Vec<String>>> {
    let mut handle = ReadHandle::open(path)?;
    if !handle.sheets.sheet_names().iter().any(|name| name == sheet) {
        return Err(ParamError::SheetNotFound(sheet.to_string()));
    }
    let range = handle.sheets.worksheet_range(sheet)?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn read_csv(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Vec<String>> {
        vec![
            vec!["Mark".to_string(), "D-01".to_string()],
            vec!["Width".to_string(), "900".to_string()],
        ]
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(WorkbookFormat::from_path(Path::new("a.XLSX")).unwrap(), WorkbookFormat::Xlsx);
        assert_eq!(WorkbookFormat::from_path(Path::new("a.csv")).unwrap(), WorkbookFormat::Csv);
        assert!(matches!(
            WorkbookFormat::from_path(Path::new("a.ods")),
            Err(ParamError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_xlsx_sheet_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.xlsx");
        write_sheet(&path, "Door 1", &["Name", "Value"], &rows()).unwrap();

        let read = read_sheet(&path, "Door 1").unwrap();
        assert_eq!(read[0], vec!["Name".to_string(), "Value".to_string()]);
        assert_eq!(read[1..], rows()[..]);
    }

    #[test]
    fn test_xlsx_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.xlsx");
        write_sheet(&path, "Door 1", &["Name", "Value"], &rows()).unwrap();

        assert!(matches!(
            read_sheet(&path, "Door 2"),
            Err(ParamError::SheetNotFound(name)) if name == "Door 2"
        ));
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.csv");
        write_sheet(&path, "ignored", &["Name", "Value"], &rows()).unwrap();

        let read = read_sheet(&path, "anything").unwrap();
        assert_eq!(read.len(), 3);
        assert_eq!(read[2], vec!["Width".to_string(), "900".to_string()]);
    }
}
