//! Blank layout for a freshly created store.

use super::{SheetData, WorkbookData};

/// What a new, empty store looks like.
///
/// Row 1 carries the title. Column headers sit on `header_row`, directly above
/// the first data row. Group captions, when present, sit on the row above the
/// headers, as long as that row is not the title row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankLayout {
    pub sheet_name: String,
    pub title: String,
    /// 1-based row of the column headers
    pub header_row: u32,
    /// Header text per column, starting at column A
    pub headers: Vec<String>,
    /// Captions spanning column groups, keyed by their first column
    pub groups: Vec<(u16, String)>,
}

impl BlankLayout {
    /// 1-based row for group captions, if there is room for one.
    pub fn group_row(&self) -> Option<u32> {
        let row = self.header_row.checked_sub(1)?;
        (row > 1 && !self.groups.is_empty()).then_some(row)
    }

    /// Build the workbook content for this layout. The data region stays empty.
    pub fn to_workbook(&self) -> WorkbookData {
        let mut book = WorkbookData::default();
        self.fill(book.sheet_or_insert(&self.sheet_name));
        book
    }

    fn fill(&self, sheet: &mut SheetData) {
        sheet.set(0, 0, &self.title);

        if let Some(row) = self.group_row() {
            for (col, caption) in &self.groups {
                sheet.set(row as usize - 1, *col as usize, caption);
            }
        }

        if self.header_row > 1 {
            for (col, header) in self.headers.iter().enumerate() {
                sheet.set(self.header_row as usize - 1, col, header);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(header_row: u32) -> BlankLayout {
        BlankLayout {
            sheet_name: "Sheet1".into(),
            title: "Implants".into(),
            header_row,
            headers: vec!["ID".into(), "Full name".into()],
            groups: vec![(1, "Patient".into())],
        }
    }

    #[test]
    fn test_default_shape() {
        let book = layout(3).to_workbook();
        let sheet = book.sheet("Sheet1").unwrap();

        assert_eq!(sheet.get(0, 0), Some("Implants"));
        assert_eq!(sheet.get(1, 1), Some("Patient"));
        assert_eq!(sheet.get(2, 0), Some("ID"));
        assert_eq!(sheet.get(2, 1), Some("Full name"));
        assert_eq!(sheet.rows().len(), 3);
    }

    #[test]
    fn test_no_group_row_next_to_title() {
        let layout = layout(2);
        assert_eq!(layout.group_row(), None);

        let book = layout.to_workbook();
        let sheet = book.sheet("Sheet1").unwrap();
        assert_eq!(sheet.get(0, 0), Some("Implants"));
        assert_eq!(sheet.get(1, 0), Some("ID"));
    }
}
