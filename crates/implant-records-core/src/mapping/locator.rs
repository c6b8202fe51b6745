//! Row locator: which sheet row a record lives in, or the next free one.

use thiserror::Error;

use super::layout::identity_of;
use super::DataWindow;

/// No free row left inside the data window.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("No available rows (max {max_rows} reached)")]
pub struct CapacityExceeded {
    pub max_rows: u32,
}

/// A resolved target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSlot {
    /// 0-based offset from the first data row
    pub offset: u32,
    /// 1-based sheet row
    pub sheet_row: u32,
    /// True when the row already holds the target identity
    pub existing: bool,
}

/// Find the row for `target`.
///
/// A non-empty `target` resolves to the first data row whose trimmed identity
/// equals it. Otherwise, or when no row matches, the first free row is
/// returned: one that is missing, empty, or has a blank identity cell.
pub fn locate(
    rows: &[Vec<String>],
    target: &str,
    window: DataWindow,
) -> Result<RowSlot, CapacityExceeded> {
    if !target.is_empty() {
        let found = window
            .data_rows(rows)
            .find(|(_, cells)| identity_of(cells) == target);
        if let Some((offset, _)) = found {
            return Ok(window.slot(offset, true));
        }
    }

    (0..window.max_rows)
        .find(|&offset| {
            window
                .row(rows, offset)
                .map_or(true, |cells| identity_of(cells).is_empty())
        })
        .map(|offset| window.slot(offset, false))
        .ok_or(CapacityExceeded {
            max_rows: window.max_rows,
        })
}
