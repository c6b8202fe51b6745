//! Tabular store layer: the worksheet grid the record engine reads and writes.
//!
//! Two backends implement [`TabularStore`]:
//! - [`XlsxWorkbook`]: an `.xlsx` file, read with calamine and written with rust_xlsxwriter
//! - [`MemoryWorkbook`]: an in-process grid, for tests and embedding
//!
//! Both buffer every `set_cell` in memory; nothing reaches the persisted
//! store until `commit`.

mod bootstrap;
mod grid;
mod memory;
mod xlsx;

pub use bootstrap::*;
pub use grid::*;
pub use memory::*;
pub use xlsx::*;

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Tabular store errors.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet read error: {0}")]
    Read(#[from] calamine::XlsxError),

    #[error("Spreadsheet write error: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Store does not exist: {0}")]
    StoreMissing(String),

    #[error("Template file not found at {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("Cell address out of range: row {row}, column {col}")]
    AddressOutOfRange { row: usize, col: usize },
}

pub type SheetResult<T> = Result<T, SheetError>;

/// An open workbook.
pub trait TabularStore {
    /// All rows of a sheet, top to bottom, each as its cell texts left to right.
    ///
    /// Row `i` of the result is sheet row `i + 1`. Rows may be shorter than
    /// the widest row; missing cells are empty.
    fn read_all_rows(&self, sheet: &str) -> SheetResult<Vec<Vec<String>>>;

    /// Stage a cell value. Not persisted until [`TabularStore::commit`].
    fn set_cell(&mut self, sheet: &str, cell: CellRef, value: &str) -> SheetResult<()>;

    /// Persist every staged cell.
    fn commit(&mut self) -> SheetResult<()>;
}

/// Where workbooks come from. Each call to `open` yields a fresh handle;
/// dropping the handle closes it.
pub trait WorkbookSource {
    type Workbook: TabularStore;

    /// Create the store from a template or the blank layout if it is absent.
    fn ensure_exists(&self, layout: &BlankLayout) -> SheetResult<()>;

    /// Open the store for reading and writing.
    fn open(&self) -> SheetResult<Self::Workbook>;
}

/// A cell address: 1-based row, 0-based column (the spreadsheet's own convention).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Zero-based grid coordinates.
    pub fn offsets(&self) -> (usize, usize) {
        (self.row.saturating_sub(1) as usize, self.col as usize)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row)
    }
}

/// Column letters for a 0-based column index (0 → `A`, 26 → `AA`).
pub fn column_name(col: u16) -> String {
    let mut n = col as u32 + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
