//! @acp:module "Bulk Apply"
//! @acp:summary "Writes an edit batch to the element and its similar elements atomically"
//! @acp:domain core
//! @acp:layer service
//!
//! # Bulk Apply
//!
//! One call, one transaction. The similar-element scan finishes before the
//! first write, so enumeration never observes its own mutations. A read-only
//! parameter on a similar element is a skip, not a failure; any write error
//! rolls the whole batch back.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::coerce::coerce;
use crate::error::{ParamError, Result};
use crate::host::{Document, Transaction};
use crate::model::{ElementId, Scope, StorageKind, Value};
use crate::view::{ElementContext, ParameterRecord};

/// @acp:summary "Where a pending value comes from"
#[derive(Debug, Clone, PartialEq)]
pub enum EditValue {
    /// Text typed by the user, coerced at write time
    Text(String),
    /// Unedited record: the typed value already stored on the source
    Stored(Value),
}

/// @acp:summary "One pending value for one record"
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    pub name: String,
    pub storage: StorageKind,
    pub scope: Scope,
    pub value: EditValue,
}

impl PendingEdit {
    /// Value to write into a parameter of the given storage kind
    ///
    /// Stored values of the same kind are copied as is, so enumerated
    /// integers and references never pass through their display text.
    fn value_for(&self, storage: StorageKind) -> Option<Value> {
        match &self.value {
            EditValue::Text(text) => coerce(storage, text),
            EditValue::Stored(value) if value.kind() == storage => Some(value.clone()),
            EditValue::Stored(value) => coerce(storage, &value.raw()),
        }
    }
}

/// @acp:summary "Selected, editable records with their pending values"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditBatch {
    edits: Vec<PendingEdit>,
}

impl EditBatch {
    /// Selected editable records; each carries its edit, or its stored value
    /// when it was not edited. Unedited records with no value are left out.
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a ParameterRecord>,
        edits: &BTreeMap<String, String>,
    ) -> Self {
        let edits = records
            .into_iter()
            .filter(|r| r.selected && r.editable)
            .filter_map(|r| {
                let value = match edits.get(&r.name) {
                    Some(text) => EditValue::Text(text.clone()),
                    None => EditValue::Stored(r.stored.clone()?),
                };
                Some(PendingEdit {
                    name: r.name.clone(),
                    storage: r.storage,
                    scope: r.scope,
                    value,
                })
            })
            .collect();
        Self { edits }
    }

    pub fn push(&mut self, edit: PendingEdit) {
        self.edits.push(edit);
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingEdit> {
        self.edits.iter()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

/// @acp:summary "Options for one apply call"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Also write to every element sharing category and type
    pub apply_to_similar: bool,
}

/// @acp:summary "Outcome of a committed apply"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Parameter writes performed
    pub written: usize,
    /// Similar elements skipped because their parameter is read-only
    pub skipped_read_only: usize,
    /// Values that could not be coerced and were left untouched
    pub ignored: usize,
    /// Size of the similar-element set
    pub similar: usize,
}

/// @acp:summary "Elements sharing the base element's category and exact type"
///
/// Type elements and the base element itself are excluded. A base element
/// without category yields an empty set.
pub fn similar_elements<D: Document + ?Sized>(doc: &D, base: ElementId) -> Result<Vec<ElementId>> {
    let element = doc.element(base).ok_or(ParamError::ElementNotFound(base))?;
    let Some(category) = element.category_id() else {
        debug!(%base, "base element has no category; no similar elements");
        return Ok(Vec::new());
    };
    let type_id = element.type_id;

    Ok(doc
        .elements()
        .into_iter()
        .filter(|e| !e.is_type && e.id != base)
        .filter(|e| e.category_id() == Some(category) && e.type_id == type_id)
        .map(|e| e.id)
        .collect())
}

/// @acp:summary "Apply an edit batch inside one transaction"
pub fn apply_batch<D: Document + ?Sized>(
    doc: &mut D,
    context: &ElementContext,
    batch: &EditBatch,
    options: ApplyOptions,
) -> Result<ApplyReport> {
    let similar = if options.apply_to_similar {
        similar_elements(&*doc, context.element)?
    } else {
        Vec::new()
    };

    let mut report = ApplyReport {
        similar: similar.len(),
        ..Default::default()
    };
    let mut tx = Transaction::start(doc, "Update Parameters")?;

    for edit in batch.iter() {
        // A stored value is already on its source; only similar elements need it.
        if let EditValue::Text(text) = &edit.value {
            let source = context
                .source(edit.scope)
                .ok_or(ParamError::ElementNotFound(ElementId::INVALID))?;
            match edit.value_for(edit.storage) {
                Some(value) => {
                    tx.set_value(source, &edit.name, value)?;
                    report.written += 1;
                }
                None => {
                    debug!(name = %edit.name, value = %text, "value not coercible; left unchanged");
                    report.ignored += 1;
                }
            }
        }

        for &other in &similar {
            let target = tx
                .element(other)
                .and_then(|e| e.parameter(&edit.name))
                .map(|p| (p.storage, p.read_only));
            match target {
                Some((_, true)) => {
                    debug!(element = %other, name = %edit.name, "read-only on similar element; skipped");
                    report.skipped_read_only += 1;
                }
                Some((storage, false)) => match edit.value_for(storage) {
                    Some(value) => {
                        tx.set_value(other, &edit.name, value)?;
                        report.written += 1;
                    }
                    None => report.ignored += 1,
                },
                None => {}
            }
        }
    }

    tx.commit()?;
    info!(
        written = report.written,
        skipped = report.skipped_read_only,
        ignored = report.ignored,
        similar = report.similar,
        "applied parameter batch"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryDocument;
    use crate::model::{Element, Parameter};
    use crate::view::build_records;

    fn door(id: i64, type_id: i64) -> Element {
        Element::new(ElementId(id))
            .in_category(ElementId(-2000023), "Doors")
            .of_type(ElementId(type_id))
            .with_parameter(Parameter::new("Mark", StorageKind::Text))
    }

    #[test]
    fn test_similar_set_matches_category_and_type() {
        let mut doc = MemoryDocument::new("t");
        doc.insert_element(door(1, 10));
        doc.insert_element(door(2, 10));
        doc.insert_element(door(3, 11));
        doc.insert_element(
            Element::new(ElementId(4))
                .in_category(ElementId(-2000011), "Walls")
                .of_type(ElementId(10)),
        );
        doc.insert_element(Element::type_element(ElementId(10)).in_category(ElementId(-2000023), "Doors"));

        assert_eq!(similar_elements(&doc, ElementId(1)).unwrap(), vec![ElementId(2)]);
    }

    #[test]
    fn test_batch_uses_edit_or_stored_value() {
        let mut doc = MemoryDocument::new("t");
        doc.insert_element(
            door(1, 10)
                .with_parameter(Parameter::new("Comments", StorageKind::Text).with_value(Value::Text("c".into())))
                .with_parameter(Parameter::new("Notes", StorageKind::Text))
                .with_parameter(Parameter::new("Area", StorageKind::Number).read_only()),
        );
        let ctx = ElementContext::resolve(&doc, ElementId(1)).unwrap();
        let set = build_records(&doc, &ctx).unwrap();

        let mut edits = BTreeMap::new();
        edits.insert("Mark".to_string(), "D-01".to_string());
        let batch = EditBatch::from_records(set.iter(), &edits);

        let values: Vec<_> = batch.iter().map(|e| (e.name.as_str(), e.value.clone())).collect();
        assert_eq!(
            values,
            [
                ("Mark", EditValue::Text("D-01".into())),
                ("Comments", EditValue::Stored(Value::Text("c".into()))),
            ]
        );
    }

    #[test]
    fn test_stored_values_copy_to_similar_without_display_text() {
        let mut doc = MemoryDocument::new("t");
        doc.insert_element(Element::new(ElementId(311)).named("1"));
        doc.insert_element(
            door(1, 10)
                .with_parameter(
                    Parameter::new("Function", StorageKind::Integer)
                        .with_value(Value::Integer(1))
                        .with_label(0, "Interior")
                        .with_label(1, "Exterior"),
                )
                .with_parameter(Parameter::new("Level", StorageKind::Reference).with_value(Value::Reference(ElementId(311))))
                .with_parameter(Parameter::new("Width", StorageKind::Number).with_value(Value::Number(900.0))),
        );
        doc.insert_element(
            door(2, 10)
                .with_parameter(Parameter::new("Function", StorageKind::Integer))
                .with_parameter(Parameter::new("Level", StorageKind::Reference))
                .with_parameter(Parameter::new("Width", StorageKind::Text)),
        );
        let ctx = ElementContext::resolve(&doc, ElementId(1)).unwrap();
        let set = build_records(&doc, &ctx).unwrap();
        assert_eq!(set.get("Level").unwrap().value, "1");
        assert_eq!(set.get("Function").unwrap().value, "Exterior");

        let batch = EditBatch::from_records(set.iter(), &BTreeMap::new());
        let report = apply_batch(&mut doc, &ctx, &batch, ApplyOptions { apply_to_similar: true }).unwrap();
        assert_eq!(report.ignored, 0);

        let value = |id: i64, name: &str| doc.element(ElementId(id)).unwrap().parameter(name).unwrap().value.clone();
        assert_eq!(value(1, "Level"), Some(Value::Reference(ElementId(311))));
        assert_eq!(value(2, "Level"), Some(Value::Reference(ElementId(311))));
        assert_eq!(value(2, "Function"), Some(Value::Integer(1)));
        assert_eq!(value(2, "Width"), Some(Value::Text("900".into())));
        assert_eq!(value(2, "Mark"), None);
    }

    #[test]
    fn test_uncoercible_value_is_ignored() {
        let mut doc = MemoryDocument::new("t");
        doc.insert_element(
            door(1, 10).with_parameter(Parameter::new("Count", StorageKind::Integer).with_value(Value::Integer(3))),
        );
        let ctx = ElementContext::resolve(&doc, ElementId(1)).unwrap();
        let mut batch = EditBatch::default();
        batch.push(PendingEdit {
            name: "Count".into(),
            storage: StorageKind::Integer,
            scope: Scope::Instance,
            value: EditValue::Text("several".into()),
        });

        let report = apply_batch(&mut doc, &ctx, &batch, ApplyOptions::default()).unwrap();
        assert_eq!(report.ignored, 1);
        assert_eq!(report.written, 0);
        assert_eq!(
            doc.element(ElementId(1)).unwrap().parameter("Count").unwrap().value,
            Some(Value::Integer(3))
        );
    }
}
