//! Patient store: ties the row-mapping engine to a workbook.
//!
//! Every call opens the workbook, does its work and drops the handle; no
//! state is kept between calls. There is no locking. Concurrent callers on
//! the same file must serialize access themselves.

mod config;

pub use config::*;

use log::debug;
use thiserror::Error;

use crate::mapping::{
    from_row, is_record, locate, next_identity_or_fallback, to_row, CapacityExceeded,
};
use crate::models::Patient;
use crate::sheet::{BlankLayout, CellRef, SheetError, TabularStore, WorkbookSource, XlsxSource};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open store: {0}")]
    Open(#[source] SheetError),

    #[error(transparent)]
    CapacityExceeded(#[from] CapacityExceeded),

    #[error("Failed to save store: {0}")]
    Commit(#[source] SheetError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Patient records kept in one worksheet.
pub struct PatientStore<S: WorkbookSource> {
    source: S,
    config: StoreConfig,
    layout: BlankLayout,
}

impl PatientStore<XlsxSource> {
    /// Store backed by the `.xlsx` file named in `config`.
    pub fn open_xlsx(config: StoreConfig) -> StoreResult<Self> {
        let source = config.xlsx_source();
        Self::new(source, config)
    }
}

impl<S: WorkbookSource> PatientStore<S> {
    pub fn new(source: S, config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let layout = config.blank_layout();
        Ok(Self {
            source,
            config,
            layout,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Save a patient and return its identity.
    ///
    /// A patient without an identity gets the next free one. The row holding
    /// the identity is overwritten; otherwise the first free row is used.
    /// Operation kinds absent from the patient leave their cells untouched.
    pub fn save(&self, patient: &Patient) -> StoreResult<String> {
        let mut book = self.open()?;
        let sheet = self.config.sheet_name.as_str();
        let window = self.config.window();

        let rows = book.read_all_rows(sheet);

        let mut record = patient.clone();
        record.id = patient.id.trim().to_string();
        if record.id.is_empty() {
            record.id = next_identity_or_fallback(rows.as_deref(), window);
        }

        let rows = rows.map_err(StoreError::Open)?;
        let slot = locate(&rows, &record.id, window)?;
        debug!(
            "{} patient {} at row {}",
            if slot.existing { "Updating" } else { "Inserting" },
            record.id,
            slot.sheet_row
        );

        for cell in to_row(&record) {
            let address = CellRef::new(slot.sheet_row, cell.col);
            book.set_cell(sheet, address, &cell.value)
                .map_err(StoreError::Commit)?;
        }
        book.commit().map_err(StoreError::Commit)?;

        Ok(record.id)
    }

    /// All records in row order.
    pub fn list_all(&self) -> StoreResult<Vec<Patient>> {
        let book = self.open()?;
        let rows = book
            .read_all_rows(&self.config.sheet_name)
            .map_err(StoreError::Open)?;

        let patients: Vec<Patient> = self
            .config
            .window()
            .data_rows(&rows)
            .filter(|(_, cells)| is_record(cells))
            .map(|(_, cells)| from_row(cells))
            .collect();

        debug!("Read {} patients", patients.len());
        Ok(patients)
    }

    /// The record with identity `id`, if any.
    pub fn get(&self, id: &str) -> StoreResult<Option<Patient>> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(None);
        }
        Ok(self.list_all()?.into_iter().find(|p| p.id == id))
    }

    fn open(&self) -> StoreResult<S::Workbook> {
        self.source
            .ensure_exists(&self.layout)
            .map_err(StoreError::Open)?;
        self.source.open().map_err(StoreError::Open)
    }
}
