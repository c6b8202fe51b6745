//! `.xlsx` file backend.
//!
//! The whole workbook is loaded into a [`WorkbookData`] grid on open. Commit
//! writes every sheet to a sibling temp file and renames it over the original,
//! so a failed commit leaves the file as it was. Text, numbers, booleans, dates
//! and formulas survive a round-trip; other cell styling, merged ranges and
//! column widths do not.

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveDateTime;
use log::{debug, info};
use rust_xlsxwriter::{Format, Formula, Workbook};

use super::{
    BlankLayout, CellRef, SheetError, SheetResult, TabularStore, TypedCell, WorkbookData,
    WorkbookSource,
};

/// Date-typed cells are rendered in the format the clinic enters by hand.
const DATE_FORMAT: &str = "%d.%m.%Y";
/// Number format given to date cells on write.
const DATE_NUM_FORMAT: &str = "dd.mm.yyyy";

/// A store file on disk, optionally seeded from a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XlsxSource {
    path: PathBuf,
    template_path: Option<PathBuf>,
}

impl XlsxSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            template_path: None,
        }
    }

    /// Copy this file instead of generating a blank layout when the store is missing.
    pub fn with_template(mut self, template_path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(template_path.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkbookSource for XlsxSource {
    type Workbook = XlsxWorkbook;

    fn ensure_exists(&self, layout: &BlankLayout) -> SheetResult<()> {
        if self.path.exists() {
            return Ok(());
        }

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        match &self.template_path {
            Some(template) => {
                if !template.exists() {
                    return Err(SheetError::TemplateMissing(template.clone()));
                }
                fs::copy(template, &self.path)?;
                info!(
                    "Created store {} from template {}",
                    self.path.display(),
                    template.display()
                );
            }
            None => {
                save_workbook(&layout.to_workbook(), &self.path)?;
                info!("Created blank store {}", self.path.display());
            }
        }

        Ok(())
    }

    fn open(&self) -> SheetResult<XlsxWorkbook> {
        XlsxWorkbook::open(&self.path)
    }
}

/// An open `.xlsx` file with staged edits.
#[derive(Debug)]
pub struct XlsxWorkbook {
    path: PathBuf,
    data: WorkbookData,
}

impl XlsxWorkbook {
    /// Open and load every sheet of the file.
    pub fn open<P: AsRef<Path>>(path: P) -> SheetResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(SheetError::StoreMissing(path.display().to_string()));
        }

        let data = load_workbook(&path)?;
        Ok(Self { path, data })
    }

    /// Current (possibly uncommitted) content.
    pub fn data(&self) -> &WorkbookData {
        &self.data
    }
}

impl TabularStore for XlsxWorkbook {
    fn read_all_rows(&self, sheet: &str) -> SheetResult<Vec<Vec<String>>> {
        self.data.read_rows(sheet)
    }

    fn set_cell(&mut self, sheet: &str, cell: CellRef, value: &str) -> SheetResult<()> {
        self.data.write_cell(sheet, cell, value)
    }

    fn commit(&mut self) -> SheetResult<()> {
        save_workbook(&self.data, &self.path)?;
        debug!("Committed {}", self.path.display());
        Ok(())
    }
}

/// Read every sheet of an `.xlsx` file into a grid.
pub fn load_workbook(path: &Path) -> SheetResult<WorkbookData> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let mut data = WorkbookData::default();

    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let formulas = workbook.worksheet_formula(&name)?;
        let sheet = data.sheet_or_insert(&name);

        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        for (row, col, cell) in range.used_cells() {
            let (row, col) = (start_row as usize + row, start_col as usize + col);
            let text = cell_to_string(cell);
            match typed_value(cell) {
                Some(typed) => sheet.set_typed(row, col, &text, typed),
                None if !text.is_empty() => sheet.set(row, col, &text),
                None => {}
            }
        }

        let (start_row, start_col) = formulas.start().unwrap_or((0, 0));
        for (row, col, formula) in formulas.used_cells() {
            let (row, col) = (start_row as usize + row, start_col as usize + col);
            let cached = sheet.get(row, col).unwrap_or_default().to_string();
            sheet.set_typed(row, col, &cached, TypedCell::Formula(formula.clone()));
        }
    }

    Ok(data)
}

/// Write a grid to `path` through a temp file in the same directory.
pub fn save_workbook(data: &WorkbookData, path: &Path) -> SheetResult<()> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format(DATE_NUM_FORMAT);

    for sheet in data.sheets() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name())?;

        for (row, col, value) in sheet.cells() {
            if sheet.typed(row, col).is_some() {
                continue;
            }
            let (r, c) = address(row, col)?;
            worksheet.write_string(r, c, value)?;
        }

        for (row, col, typed) in sheet.typed_cells() {
            let (r, c) = address(row, col)?;
            match typed {
                TypedCell::Number(n) => {
                    worksheet.write_number(r, c, *n)?;
                }
                TypedCell::Bool(b) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                TypedCell::Date(serial) => {
                    worksheet.write_number_with_format(r, c, *serial, &date_format)?;
                }
                TypedCell::Formula(formula) => {
                    let cached = sheet.get(row, col).unwrap_or_default();
                    let formula = Formula::new(formula);
                    let formula = if cached.is_empty() {
                        formula
                    } else {
                        formula.set_result(cached)
                    };
                    worksheet.write_formula(r, c, formula)?;
                }
            }
        }
    }

    let tmp = temp_path(path);
    if let Err(e) = workbook.save(&tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    Ok(())
}

fn address(row: usize, col: usize) -> SheetResult<(u32, u16)> {
    match (u32::try_from(row), u16::try_from(col)) {
        (Ok(r), Ok(c)) => Ok((r, c)),
        _ => Err(SheetError::AddressOutOfRange { row, col }),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Cell text as the record engine sees it.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(format_date)
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        _ => String::new(),
    }
}

fn format_date(date: NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// What a cell needs besides its text to be written back unchanged.
fn typed_value(cell: &Data) -> Option<TypedCell> {
    match cell {
        Data::Int(i) => Some(TypedCell::Number(*i as f64)),
        Data::Float(f) => Some(TypedCell::Number(*f)),
        Data::Bool(b) => Some(TypedCell::Bool(*b)),
        Data::DateTime(dt) if dt.is_datetime() => Some(TypedCell::Date(dt.as_f64())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn layout() -> BlankLayout {
        BlankLayout {
            sheet_name: "Sheet1".into(),
            title: "Implants".into(),
            header_row: 3,
            headers: vec!["ID".into(), "Full name".into()],
            groups: vec![],
        }
    }

    #[test]
    fn test_whole_floats_read_as_integers() {
        assert_eq!(cell_to_string(&Data::Float(42.0)), "42");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_typed_values() {
        assert_eq!(typed_value(&Data::Float(2.5)), Some(TypedCell::Number(2.5)));
        assert_eq!(typed_value(&Data::Bool(true)), Some(TypedCell::Bool(true)));
        assert_eq!(typed_value(&Data::String("5".into())), None);
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let tmp = temp_path(Path::new("/data/Implants.xlsx"));
        assert_eq!(tmp, PathBuf::from("/data/Implants.xlsx.tmp"));
    }

    #[test]
    fn test_ensure_exists_creates_blank_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("Implants.xlsx");
        let source = XlsxSource::new(&path);

        source.ensure_exists(&layout()).unwrap();
        assert!(path.exists());

        let book = source.open().unwrap();
        let rows = book.read_all_rows("Sheet1").unwrap();
        assert_eq!(rows[0][0], "Implants");
        assert_eq!(rows[2], vec!["ID", "Full name"]);
    }

    #[test]
    fn test_ensure_exists_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Implants.xlsx");
        let source = XlsxSource::new(&path);
        source.ensure_exists(&layout()).unwrap();

        let mut book = source.open().unwrap();
        book.set_cell("Sheet1", CellRef::new(4, 0), "1").unwrap();
        book.commit().unwrap();

        source.ensure_exists(&layout()).unwrap();
        let rows = source.open().unwrap().read_all_rows("Sheet1").unwrap();
        assert_eq!(rows[3][0], "1");
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let dir = TempDir::new().unwrap();
        let source = XlsxSource::new(dir.path().join("Implants.xlsx"))
            .with_template(dir.path().join("templates").join("Implants.xlsx"));

        let result = source.ensure_exists(&layout());
        assert!(matches!(result, Err(SheetError::TemplateMissing(_))));
    }

    #[test]
    fn test_template_is_copied() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("template.xlsx");
        let mut data = WorkbookData::default();
        data.sheet_or_insert("Sheet1").set(0, 0, "Clinic template");
        save_workbook(&data, &template).unwrap();

        let source = XlsxSource::new(dir.path().join("Implants.xlsx")).with_template(&template);
        source.ensure_exists(&layout()).unwrap();

        let rows = source.open().unwrap().read_all_rows("Sheet1").unwrap();
        assert_eq!(rows[0][0], "Clinic template");
    }

    #[test]
    fn test_edits_are_deferred_until_commit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Implants.xlsx");
        let source = XlsxSource::new(&path);
        source.ensure_exists(&layout()).unwrap();

        let mut book = source.open().unwrap();
        book.set_cell("Sheet1", CellRef::new(4, 1), "Ivanov").unwrap();
        assert_eq!(book.read_all_rows("Sheet1").unwrap()[3][1], "Ivanov");

        let on_disk = load_workbook(&path).unwrap();
        assert_eq!(on_disk.read_rows("Sheet1").unwrap().len(), 3);

        drop(book);
        let on_disk = load_workbook(&path).unwrap();
        assert_eq!(on_disk.read_rows("Sheet1").unwrap().len(), 3);
    }

    #[test]
    fn test_other_sheets_survive_commit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Implants.xlsx");
        let mut data = layout().to_workbook();
        data.sheet_or_insert("Notes").set(1, 1, "keep me");
        save_workbook(&data, &path).unwrap();

        let mut book = XlsxWorkbook::open(&path).unwrap();
        book.set_cell("Sheet1", CellRef::new(4, 0), "1").unwrap();
        book.commit().unwrap();

        let reloaded = load_workbook(&path).unwrap();
        assert_eq!(reloaded.sheet("Notes").unwrap().get(1, 1), Some("keep me"));
        assert_eq!(reloaded.sheet("Sheet1").unwrap().get(3, 0), Some("1"));
    }

    #[test]
    fn test_numbers_dates_and_formulas_survive_commit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Implants.xlsx");
        let mut data = layout().to_workbook();
        let stats = data.sheet_or_insert("Stats");
        stats.set_typed(0, 0, "5", TypedCell::Number(5.0));
        stats.set_typed(1, 0, "10", TypedCell::Formula("A1*2".into()));
        stats.set_typed(2, 0, "12.03.2024", TypedCell::Date(45363.0));
        stats.set_typed(3, 0, "true", TypedCell::Bool(true));
        save_workbook(&data, &path).unwrap();

        let mut book = XlsxWorkbook::open(&path).unwrap();
        book.set_cell("Sheet1", CellRef::new(4, 0), "1").unwrap();
        book.commit().unwrap();

        let mut raw: Xlsx<_> = open_workbook(&path).unwrap();
        let formulas = raw.worksheet_formula("Stats").unwrap();
        assert_eq!(formulas.get_value((1, 0)), Some(&"A1*2".to_string()));
        let values = raw.worksheet_range("Stats").unwrap();
        assert_eq!(values.get_value((0, 0)), Some(&Data::Float(5.0)));
        assert_eq!(values.get_value((3, 0)), Some(&Data::Bool(true)));

        let reloaded = load_workbook(&path).unwrap();
        let stats = reloaded.sheet("Stats").unwrap();
        assert_eq!(stats.get(0, 0), Some("5"));
        assert_eq!(stats.get(1, 0), Some("10"));
        assert_eq!(stats.get(2, 0), Some("12.03.2024"));
        assert_eq!(stats.typed(1, 0), Some(&TypedCell::Formula("A1*2".into())));
        assert_eq!(stats.typed(2, 0), Some(&TypedCell::Date(45363.0)));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = XlsxWorkbook::open(dir.path().join("absent.xlsx"));
        assert!(matches!(result, Err(SheetError::StoreMissing(_))));
    }
}
