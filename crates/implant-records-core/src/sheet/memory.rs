//! In-memory backend.

use std::cell::RefCell;
use std::rc::Rc;

use super::{
    BlankLayout, CellRef, SheetError, SheetResult, TabularStore, WorkbookData, WorkbookSource,
};

/// A store that lives in process memory. Clones share the same content.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    persisted: Rc<RefCell<Option<WorkbookData>>>,
}

impl MemorySource {
    /// A source with no store yet; `ensure_exists` will create one.
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose store already holds `data`.
    pub fn with_data(data: WorkbookData) -> Self {
        Self {
            persisted: Rc::new(RefCell::new(Some(data))),
        }
    }

    /// Committed content, if the store exists.
    pub fn snapshot(&self) -> Option<WorkbookData> {
        self.persisted.borrow().clone()
    }
}

impl WorkbookSource for MemorySource {
    type Workbook = MemoryWorkbook;

    fn ensure_exists(&self, layout: &BlankLayout) -> SheetResult<()> {
        let mut persisted = self.persisted.borrow_mut();
        if persisted.is_none() {
            *persisted = Some(layout.to_workbook());
        }
        Ok(())
    }

    fn open(&self) -> SheetResult<MemoryWorkbook> {
        let working = self
            .persisted
            .borrow()
            .clone()
            .ok_or_else(|| SheetError::StoreMissing("in-memory store".into()))?;
        Ok(MemoryWorkbook {
            persisted: Rc::clone(&self.persisted),
            working,
        })
    }
}

/// An open in-memory workbook; edits go to a private copy until commit.
#[derive(Debug)]
pub struct MemoryWorkbook {
    persisted: Rc<RefCell<Option<WorkbookData>>>,
    working: WorkbookData,
}

impl TabularStore for MemoryWorkbook {
    fn read_all_rows(&self, sheet: &str) -> SheetResult<Vec<Vec<String>>> {
        self.working.read_rows(sheet)
    }

    fn set_cell(&mut self, sheet: &str, cell: CellRef, value: &str) -> SheetResult<()> {
        self.working.write_cell(sheet, cell, value)
    }

    fn commit(&mut self) -> SheetResult<()> {
        *self.persisted.borrow_mut() = Some(self.working.clone());
        Ok(())
    }
}
