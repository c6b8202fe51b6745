//! In-memory workbook grid shared by both backends.

use std::collections::BTreeMap;

use super::{CellRef, SheetError, SheetResult};

/// Content of a cell that is not plain text.
///
/// The grid text still holds how such a cell reads; this keeps what a
/// writer needs to put the cell back as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedCell {
    Number(f64),
    Bool(bool),
    /// Excel date serial.
    Date(f64),
    /// Formula text without the leading `=`; the grid text is its cached result.
    Formula(String),
}

/// One worksheet as a ragged grid of cell texts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetData {
    name: String,
    rows: Vec<Vec<String>>,
    typed: BTreeMap<(usize, usize), TypedCell>,
}

impl SheetData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            typed: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set a cell to plain text by 0-based offsets, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, value: &str) {
        self.typed.remove(&(row, col));
        self.put_text(row, col, value);
    }

    /// Set a cell that carries a number, date, boolean or formula.
    pub fn set_typed(&mut self, row: usize, col: usize, text: &str, value: TypedCell) {
        self.put_text(row, col, text);
        self.typed.insert((row, col), value);
    }

    /// Get a cell's text by 0-based offsets.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(String::as_str)
    }

    pub fn typed(&self, row: usize, col: usize) -> Option<&TypedCell> {
        self.typed.get(&(row, col))
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Non-empty cells as `(row, col, text)` with 0-based offsets.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &str)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, value)| !value.is_empty())
                .map(move |(col, value)| (row, col, value.as_str()))
        })
    }

    /// Typed cells in row-major order.
    pub fn typed_cells(&self) -> impl Iterator<Item = (usize, usize, &TypedCell)> + '_ {
        self.typed
            .iter()
            .map(|(&(row, col), value)| (row, col, value))
    }

    fn put_text(&mut self, row: usize, col: usize, value: &str) {
        if row >= self.rows.len() {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if col >= cells.len() {
            cells.resize_with(col + 1, String::new);
        }
        cells[col] = value.to_string();
    }
}

/// All worksheets of a workbook, in tab order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkbookData {
    sheets: Vec<SheetData>,
}

impl WorkbookData {
    pub fn sheets(&self) -> &[SheetData] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetData> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut SheetData> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    /// Get a sheet, appending an empty one if it does not exist.
    pub fn sheet_or_insert(&mut self, name: &str) -> &mut SheetData {
        match self.sheets.iter().position(|s| s.name == name) {
            Some(idx) => &mut self.sheets[idx],
            None => {
                self.sheets.push(SheetData::new(name));
                let last = self.sheets.len() - 1;
                &mut self.sheets[last]
            }
        }
    }

    /// Rows of a sheet, for [`super::TabularStore::read_all_rows`].
    pub fn read_rows(&self, sheet: &str) -> SheetResult<Vec<Vec<String>>> {
        self.sheet(sheet)
            .map(|s| s.rows().to_vec())
            .ok_or_else(|| SheetError::SheetNotFound(sheet.to_string()))
    }

    /// Write one cell of an existing sheet, for [`super::TabularStore::set_cell`].
    pub fn write_cell(&mut self, sheet: &str, cell: CellRef, value: &str) -> SheetResult<()> {
        let (row, col) = cell.offsets();
        let data = self
            .sheet_mut(sheet)
            .ok_or_else(|| SheetError::SheetNotFound(sheet.to_string()))?;
        data.set(row, col, value);
        Ok(())
    }
}
