//! @acp:module "Editor Session"
//! @acp:summary "Modal parameter-editor session: filter, edit, apply, import, export, bind, remove"
//! @acp:domain core
//! @acp:layer service
//!
//! # Editor Session
//!
//! A session owns the document and edits one element. Every operation takes
//! `&mut self` and runs to completion, so operations never overlap.
//!
//! ```text
//! Idle -> Filtered -> Editing -> { Applying | Exporting | Importing
//!                                 | AddingParameter | RemovingParameter } -> Filtered
//! ```
//!
//! The record set is an `Arc` snapshot. Structural changes (apply, import,
//! add, remove) build a new snapshot and swap it in; readers holding the
//! old one keep a consistent view.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::apply::{apply_batch, ApplyOptions, ApplyReport, EditBatch};
use crate::binding::{bind_definition, remove_bindings, NewParameter, RemovalReport};
use crate::config::Config;
use crate::definitions::{DefinitionFile, LazyDefinitionFile};
use crate::error::{ParamError, Result};
use crate::host::{run_in_transaction, Document};
use crate::model::ElementId;
use crate::tabular::{self, ImportReport};
use crate::view::{build_records, ElementContext, ParameterRecord, RecordFilter, RecordSet};

/// @acp:summary "Where the dialog session currently is"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Filtered,
    Editing,
    Applying,
    Exporting,
    Importing,
    AddingParameter,
    RemovingParameter,
}

/// @acp:summary "Editor session over one element of a document"
pub struct ParameterSession<D: Document> {
    document: D,
    config: Config,
    context: ElementContext,
    records: Arc<RecordSet>,
    filter: RecordFilter,
    selected: BTreeSet<String>,
    edits: BTreeMap<String, String>,
    state: SessionState,
}

impl<D: Document> ParameterSession<D> {
    /// @acp:summary "Open a session on an element, or on the first selected one"
    pub fn open(document: D, element: Option<ElementId>, config: Config) -> Result<Self> {
        let element = match element {
            Some(id) => id,
            None => document
                .selection()
                .into_iter()
                .find(|id| document.element(*id).is_some())
                .ok_or_else(|| ParamError::NothingSelected("please select an element".into()))?,
        };
        let context = ElementContext::resolve(&document, element)?;
        let records = Arc::new(build_records(&document, &context)?);
        let selected = records.iter().map(|r| r.name.clone()).collect();
        debug!(%element, records = records.len(), "session opened");

        Ok(Self {
            document,
            config,
            context,
            records,
            filter: RecordFilter::default(),
            selected,
            edits: BTreeMap::new(),
            state: SessionState::Idle,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn context(&self) -> &ElementContext {
        &self.context
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    /// Current snapshot as last built from the document
    pub fn records(&self) -> Arc<RecordSet> {
        Arc::clone(&self.records)
    }

    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }

    pub fn pending_edits(&self) -> &BTreeMap<String, String> {
        &self.edits
    }

    /// @acp:summary "Apply a search/editable-only filter"
    ///
    /// Every visible record becomes selected, as on each grid refresh.
    pub fn set_filter(&mut self, filter: RecordFilter) {
        self.filter = filter;
        self.refresh();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let filter = RecordFilter {
            search: search.into(),
            ..self.filter.clone()
        };
        self.set_filter(filter);
    }

    pub fn set_editable_only(&mut self, editable_only: bool) {
        let filter = RecordFilter {
            editable_only,
            ..self.filter.clone()
        };
        self.set_filter(filter);
    }

    /// @acp:summary "Records passing the filter, with pending edits and selection overlaid"
    pub fn visible(&self) -> Vec<ParameterRecord> {
        self.records
            .iter()
            .filter(|r| self.filter.matches(r))
            .map(|r| {
                let mut record = r.clone();
                if let Some(edit) = self.edits.get(&r.name) {
                    record.value = edit.clone();
                }
                record.selected = self.selected.contains(&r.name);
                record
            })
            .collect()
    }

    /// Select or clear every visible record
    pub fn select_all(&mut self, selected: bool) {
        let names: Vec<String> = self.visible_names();
        for name in names {
            if selected {
                self.selected.insert(name);
            } else {
                self.selected.remove(&name);
            }
        }
    }

    pub fn set_selected(&mut self, name: &str, selected: bool) -> Result<()> {
        self.require_record(name)?;
        if selected {
            self.selected.insert(name.to_string());
        } else {
            self.selected.remove(name);
        }
        Ok(())
    }

    /// Select exactly these records, clearing everything else
    pub fn select_only<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        for name in names {
            self.require_record(name.as_ref())?;
        }
        self.selected = names.iter().map(|n| n.as_ref().to_string()).collect();
        Ok(())
    }

    /// @acp:summary "Stage an in-place value change"
    pub fn edit(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let record = self.require_record(name)?;
        if !record.editable {
            return Err(ParamError::ReadOnly(name.to_string()));
        }
        self.edits.insert(name.to_string(), value.into());
        self.state = SessionState::Editing;
        Ok(())
    }

    /// @acp:summary "Write selected records to the element (and similar elements)"
    pub fn apply(&mut self, apply_to_similar: bool) -> Result<ApplyReport> {
        self.state = SessionState::Applying;
        let visible = self.visible();
        let batch = EditBatch::from_records(visible.iter(), &self.edits);
        let result = apply_batch(
            &mut self.document,
            &self.context,
            &batch,
            ApplyOptions { apply_to_similar },
        );
        self.finish(result, true)
    }

    /// @acp:summary "Export visible, selected records to a workbook"
    pub fn export(&mut self, path: &Path) -> Result<usize> {
        self.state = SessionState::Exporting;
        let result = self
            .sheet_name()
            .and_then(|sheet| tabular::export_records(path, &sheet, self.visible().iter()));
        self.finish(result, false)
    }

    /// @acp:summary "Merge a workbook sheet into the element"
    pub fn import(&mut self, path: &Path) -> Result<ImportReport> {
        self.state = SessionState::Importing;
        let result = self.run_import(path);
        self.finish(result, true)
    }

    fn run_import(&mut self, path: &Path) -> Result<ImportReport> {
        let sheet = self.sheet_name()?;
        let grid = tabular::read_sheet(path, &sheet)?;
        let rows = tabular::parse_rows(&grid)?;
        info!(path = %path.display(), sheet = %sheet, rows = rows.len(), "importing parameters");

        let mut definitions = LazyDefinitionFile::new(
            &self.config.definition_file,
            self.config.create_definition_file,
        );
        let report = tabular::import_rows(
            &mut self.document,
            &self.context,
            &rows,
            &mut definitions,
            &self.config.definition_group,
        )?;
        if let Some(mut file) = definitions.into_inner() {
            file.save_if_dirty()?;
        }
        Ok(report)
    }

    /// @acp:summary "Create or reuse a definition and bind it to the element's category"
    pub fn add_parameter(&mut self, request: &NewParameter) -> Result<()> {
        self.state = SessionState::AddingParameter;
        let result = self.run_add(request);
        self.finish(result, true)
    }

    fn run_add(&mut self, request: &NewParameter) -> Result<()> {
        if request.name.trim().is_empty() {
            return Err(ParamError::EmptyName);
        }
        let category = self
            .document
            .element(self.context.element)
            .and_then(|e| e.category_id())
            .ok_or(ParamError::NoCategory(self.context.element))?;

        let mut definitions = DefinitionFile::open_or_create(
            &self.config.definition_file,
            self.config.create_definition_file,
        )?;
        let group = &self.config.definition_group;
        run_in_transaction(&mut self.document, "Bind Shared Parameter", |doc| {
            bind_definition(doc, category, &mut definitions, group, request)
        })?;
        definitions.save_if_dirty()?;
        Ok(())
    }

    /// @acp:summary "Remove the bindings of the selected shared/project parameters"
    ///
    /// `confirm` sees the names about to be removed; returning `false`
    /// cancels without touching the document.
    pub fn remove_selected<F>(&mut self, confirm: F) -> Result<RemovalReport>
    where
        F: FnOnce(&[String]) -> bool,
    {
        self.state = SessionState::RemovingParameter;
        let result = self.run_remove(confirm);
        let rebuild = matches!(&result, Ok(report) if !report.removed.is_empty());
        self.finish(result, rebuild)
    }

    fn run_remove<F>(&mut self, confirm: F) -> Result<RemovalReport>
    where
        F: FnOnce(&[String]) -> bool,
    {
        let names: BTreeSet<String> = self
            .visible()
            .into_iter()
            .filter(|r| r.selected && r.origin.is_bound())
            .map(|r| r.name)
            .collect();
        if names.is_empty() {
            return Err(ParamError::NothingSelected(
                "no shared or project parameters selected".into(),
            ));
        }

        let listed: Vec<String> = names.iter().cloned().collect();
        if !confirm(&listed) {
            info!("parameter removal cancelled");
            return Ok(RemovalReport::default());
        }

        DefinitionFile::open(&self.config.definition_file)?;
        remove_bindings(&mut self.document, &names, self.config.removal_delay())
    }

    fn sheet_name(&self) -> Result<String> {
        let element = self
            .document
            .element(self.context.element)
            .ok_or(ParamError::ElementNotFound(self.context.element))?;
        Ok(tabular::sheet_name(element, self.config.sheet_name_limit))
    }

    fn require_record(&self, name: &str) -> Result<&ParameterRecord> {
        self.records
            .get(name)
            .ok_or_else(|| ParamError::ParameterNotFound {
                element: self.context.element,
                name: name.to_string(),
            })
    }

    fn visible_names(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| self.filter.matches(r))
            .map(|r| r.name.clone())
            .collect()
    }

    /// Select every visible record and settle in Filtered
    fn refresh(&mut self) {
        self.selected = self.visible_names().into_iter().collect();
        self.state = SessionState::Filtered;
    }

    /// Rebuild the snapshot from the document and drop pending edits
    fn rebuild(&mut self) -> Result<()> {
        self.records = Arc::new(build_records(&self.document, &self.context)?);
        self.edits.clear();
        self.refresh();
        debug!(records = self.records.len(), "record set rebuilt");
        Ok(())
    }

    fn finish<T>(&mut self, result: Result<T>, rebuild_on_success: bool) -> Result<T> {
        let result = match result {
            Ok(value) if rebuild_on_success => self.rebuild().map(|_| value),
            other => other,
        };
        self.state = SessionState::Filtered;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryDocument;
    use crate::model::{Element, Parameter, ParameterOrigin, StorageKind, Value};

    fn session() -> ParameterSession<MemoryDocument> {
        let mut doc = MemoryDocument::new("t");
        doc.insert_element(
            Element::new(ElementId(1))
                .named("Wall A")
                .in_category(ElementId(-2000011), "Walls")
                .with_parameter(Parameter::new("Comments", StorageKind::Text))
                .with_parameter(Parameter::new("Length", StorageKind::Number).read_only())
                .with_parameter(
                    Parameter::new("Fire Rating", StorageKind::Text).with_origin(ParameterOrigin::Shared),
                ),
        );
        doc.select([ElementId(1)]);
        let config = Config {
            removal_delay_ms: 0,
            ..Config::default()
        };
        ParameterSession::open(doc, None, config).unwrap()
    }

    #[test]
    fn test_open_uses_selection() {
        let s = session();
        assert_eq!(s.context().element, ElementId(1));
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.visible().len(), 3);
    }

    #[test]
    fn test_open_without_selection_fails() {
        let doc = MemoryDocument::new("t");
        assert!(matches!(
            ParameterSession::open(doc, None, Config::default()),
            Err(ParamError::NothingSelected(_))
        ));
    }

    #[test]
    fn test_filter_reselects_visible() {
        let mut s = session();
        s.select_all(false);
        assert!(s.visible().iter().all(|r| !r.selected));

        s.set_editable_only(true);
        assert_eq!(s.state(), SessionState::Filtered);
        let visible = s.visible();
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|r| r.selected));
    }

    #[test]
    fn test_edit_rejects_read_only() {
        let mut s = session();
        assert!(matches!(s.edit("Length", "5"), Err(ParamError::ReadOnly(_))));
        assert!(matches!(s.edit("Nope", "5"), Err(ParamError::ParameterNotFound { .. })));
        s.edit("Comments", "hello").unwrap();
        assert_eq!(s.state(), SessionState::Editing);
        assert_eq!(s.visible()[0].value, "hello");
    }

    #[test]
    fn test_apply_rebuilds_snapshot() {
        let mut s = session();
        let before = s.records();
        s.edit("Comments", "hello").unwrap();
        s.select_only(&["Comments"]).unwrap();

        let report = s.apply(false).unwrap();
        assert_eq!(report.written, 1);
        assert_eq!(s.state(), SessionState::Filtered);
        assert!(s.pending_edits().is_empty());

        assert_eq!(before.get("Comments").unwrap().value, "");
        assert_eq!(s.records().get("Comments").unwrap().value, "hello");
        assert_eq!(
            s.document().element(ElementId(1)).unwrap().parameter("Comments").unwrap().value,
            Some(Value::Text("hello".into()))
        );
    }

    #[test]
    fn test_deselected_edit_is_not_applied() {
        let mut s = session();
        s.edit("Comments", "hello").unwrap();
        s.set_selected("Comments", false).unwrap();
        assert!(!s.visible()[0].selected);
        assert!(matches!(
            s.set_selected("Nope", true),
            Err(ParamError::ParameterNotFound { .. })
        ));

        let report = s.apply(false).unwrap();
        assert_eq!(report.written, 0);
        assert_eq!(s.records().get("Comments").unwrap().value, "");

        s.edit("Comments", "hello").unwrap();
        s.select_all(false);
        s.set_selected("Comments", true).unwrap();
        assert_eq!(s.apply(false).unwrap().written, 1);
        assert_eq!(s.records().get("Comments").unwrap().value, "hello");
    }

    #[test]
    fn test_remove_requires_bound_selection() {
        let mut s = session();
        s.select_only(&["Comments"]).unwrap();
        assert!(matches!(
            s.remove_selected(|_| true),
            Err(ParamError::NothingSelected(_))
        ));
        assert_eq!(s.state(), SessionState::Filtered);
    }

    #[test]
    fn test_remove_cancelled_by_confirm() {
        let mut s = session();
        let report = s
            .remove_selected(|names| {
                assert_eq!(names, ["Fire Rating".to_string()]);
                false
            })
            .unwrap();
        assert!(report.removed.is_empty());
        assert!(s.records().get("Fire Rating").is_some());
    }
}
