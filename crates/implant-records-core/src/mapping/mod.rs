//! Row-mapping engine: cell codec, column layout, row locator, identity generator.
//!
//! Everything here works on plain row data (`&[Vec<String>]`, row `i` being
//! sheet row `i + 1`) and never touches a file.

mod codec;
mod identity;
mod layout;
mod locator;

pub use codec::*;
pub use identity::*;
pub use layout::*;
pub use locator::*;

/// The data region of the sheet: `max_rows` rows starting at 1-based `start_row`.
/// Rows above `start_row` hold the title and headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataWindow {
    pub start_row: u32,
    pub max_rows: u32,
}

impl DataWindow {
    pub fn new(start_row: u32, max_rows: u32) -> Self {
        Self {
            start_row,
            max_rows,
        }
    }

    /// 1-based sheet row of a data row offset.
    pub fn sheet_row(&self, offset: u32) -> u32 {
        self.start_row + offset
    }

    /// Index into a `read_all_rows` result for a data row offset.
    fn row_index(&self, offset: u32) -> usize {
        (self.start_row as usize).saturating_sub(1) + offset as usize
    }

    /// Data row at `offset`, if the sheet is that long.
    pub fn row<'a>(&self, rows: &'a [Vec<String>], offset: u32) -> Option<&'a [String]> {
        if offset >= self.max_rows {
            return None;
        }
        rows.get(self.row_index(offset)).map(Vec::as_slice)
    }

    /// Existing data rows inside the window, with their offsets.
    pub fn data_rows<'a>(
        &self,
        rows: &'a [Vec<String>],
    ) -> impl Iterator<Item = (u32, &'a [String])> + 'a {
        let window = *self;
        (0..self.max_rows).map_while(move |offset| window.row(rows, offset).map(|r| (offset, r)))
    }

    fn slot(&self, offset: u32, existing: bool) -> RowSlot {
        RowSlot {
            offset,
            sheet_row: self.sheet_row(offset),
            existing,
        }
    }
}
