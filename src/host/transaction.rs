//! @acp:module "Scoped Transactions"
//! @acp:summary "RAII guard: commit explicitly, roll back on drop"
//! @acp:domain host
//! @acp:layer service

use std::ops::{Deref, DerefMut};

use tracing::{debug, info, warn};

use super::Document;
use crate::error::Result;

/// @acp:summary "An open host transaction"
///
/// Dereferences to the document so writes read naturally. Dropping the
/// guard without calling [`Transaction::commit`] rolls the transaction back,
/// which covers `?` early returns and unwinding alike.
pub struct Transaction<'a, D: Document + ?Sized> {
    doc: &'a mut D,
    name: String,
    open: bool,
}

impl<'a, D: Document + ?Sized> Transaction<'a, D> {
    /// @acp:summary "Start a named transaction on the document"
    pub fn start(doc: &'a mut D, name: &str) -> Result<Self> {
        doc.begin_transaction(name)?;
        debug!(transaction = name, "transaction started");
        Ok(Self {
            doc,
            name: name.to_string(),
            open: true,
        })
    }

    /// @acp:summary "Commit all writes made through this guard"
    pub fn commit(mut self) -> Result<()> {
        self.doc.commit_transaction()?;
        self.open = false;
        info!(transaction = %self.name, "transaction committed");
        Ok(())
    }

    /// Roll back explicitly instead of waiting for drop
    pub fn rollback(mut self) -> Result<()> {
        self.open = false;
        self.doc.rollback_transaction()?;
        warn!(transaction = %self.name, "transaction rolled back");
        Ok(())
    }
}

impl<D: Document + ?Sized> Deref for Transaction<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        &*self.doc
    }
}

impl<D: Document + ?Sized> DerefMut for Transaction<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut *self.doc
    }
}

impl<D: Document + ?Sized> Drop for Transaction<'_, D> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        match self.doc.rollback_transaction() {
            Ok(()) => warn!(transaction = %self.name, "transaction rolled back"),
            Err(e) => warn!(transaction = %self.name, error = %e, "rollback failed"),
        }
    }
}

/// @acp:summary "Run a closure inside one transaction"
///
/// Commits when the closure returns `Ok`, rolls back otherwise.
pub fn run_in_transaction<D, T, F>(doc: &mut D, name: &str, f: F) -> Result<T>
where
    D: Document + ?Sized,
    F: FnOnce(&mut D) -> Result<T>,
{
    let mut tx = Transaction::start(doc, name)?;
    let value = f(&mut *tx)?;
    tx.commit()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParamError;
    use crate::host::MemoryDocument;
    use crate::model::{Element, ElementId, Parameter, StorageKind, Value};

    fn doc() -> MemoryDocument {
        let mut doc = MemoryDocument::new("test");
        doc.insert_element(
            Element::new(ElementId(1))
                .with_parameter(Parameter::new("Mark", StorageKind::Text).with_value(Value::Text("A".into()))),
        );
        doc
    }

    fn mark(doc: &MemoryDocument) -> Option<Value> {
        doc.element(ElementId(1))
            .and_then(|e| e.parameter("Mark"))
            .and_then(|p| p.value.clone())
    }

    #[test]
    fn test_commit_keeps_writes() {
        let mut doc = doc();
        let mut tx = Transaction::start(&mut doc, "edit").unwrap();
        tx.set_value(ElementId(1), "Mark", Value::Text("B".into())).unwrap();
        tx.commit().unwrap();

        assert!(!doc.in_transaction());
        assert_eq!(mark(&doc), Some(Value::Text("B".into())));
    }

    #[test]
    fn test_drop_rolls_back() {
        let mut doc = doc();
        {
            let mut tx = Transaction::start(&mut doc, "edit").unwrap();
            tx.set_value(ElementId(1), "Mark", Value::Text("B".into())).unwrap();
        }
        assert!(!doc.in_transaction());
        assert_eq!(mark(&doc), Some(Value::Text("A".into())));
    }

    #[test]
    fn test_explicit_rollback_discards_writes() {
        let mut doc = doc();
        let mut tx = Transaction::start(&mut doc, "edit").unwrap();
        tx.set_value(ElementId(1), "Mark", Value::Text("B".into())).unwrap();
        tx.rollback().unwrap();

        assert!(!doc.in_transaction());
        assert_eq!(mark(&doc), Some(Value::Text("A".into())));
    }

    #[test]
    fn test_run_in_transaction_rolls_back_on_error() {
        let mut doc = doc();
        let result: Result<()> = run_in_transaction(&mut doc, "edit", |d| {
            d.set_value(ElementId(1), "Mark", Value::Text("B".into()))?;
            Err(ParamError::Other("boom".into()))
        });
        assert!(result.is_err());
        assert_eq!(mark(&doc), Some(Value::Text("A".into())));
    }
}
