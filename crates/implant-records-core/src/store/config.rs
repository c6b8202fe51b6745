//! Store configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mapping::{column_headers, group_captions, DataWindow};
use crate::sheet::{BlankLayout, XlsxSource};

/// First data row (1-based); rows above hold the title and headers.
pub const DEFAULT_START_ROW: u32 = 4;
/// Maximum number of records.
pub const DEFAULT_MAX_ROWS: u32 = 1000;
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";
pub const DEFAULT_TITLE: &str = "Implants";
pub const DEFAULT_DIR_NAME: &str = "SmileOpsTables";
pub const DEFAULT_FILE_NAME: &str = "Implants.xlsx";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Where the store lives and how its sheet is laid out.
///
/// Every field has a default, so a TOML file only needs the values it changes:
///
/// ```toml
/// path = "/srv/clinic/Implants.xlsx"
/// max_rows = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store file
    pub path: PathBuf,
    /// File copied into place when the store does not exist yet
    pub template_path: Option<PathBuf>,
    /// Worksheet holding the records
    pub sheet_name: String,
    /// 1-based row of the first record
    pub start_row: u32,
    /// Record capacity
    pub max_rows: u32,
    /// Title written into a generated blank sheet
    pub title: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            template_path: None,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            start_row: DEFAULT_START_ROW,
            max_rows: DEFAULT_MAX_ROWS,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Default layout for a store at `path`.
    pub fn at<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check the layout leaves room for a title and a header row.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_row < 3 {
            return Err(ConfigError::Invalid(format!(
                "start_row must be at least 3 (title and header rows), got {}",
                self.start_row
            )));
        }
        if self.max_rows == 0 {
            return Err(ConfigError::Invalid("max_rows must be positive".into()));
        }
        if self.sheet_name.trim().is_empty() {
            return Err(ConfigError::Invalid("sheet_name must not be empty".into()));
        }
        Ok(())
    }

    pub fn window(&self) -> DataWindow {
        DataWindow::new(self.start_row, self.max_rows)
    }

    /// Blank sheet used when no template is configured.
    pub fn blank_layout(&self) -> BlankLayout {
        BlankLayout {
            sheet_name: self.sheet_name.clone(),
            title: self.title.clone(),
            header_row: self.start_row.saturating_sub(1),
            headers: column_headers(),
            groups: group_captions(),
        }
    }

    /// File-backed source for this config.
    pub fn xlsx_source(&self) -> XlsxSource {
        let source = XlsxSource::new(&self.path);
        match &self.template_path {
            Some(template) => source.with_template(template),
            None => source,
        }
    }
}

/// `<Desktop>/SmileOpsTables/Implants.xlsx`, falling back to the home
/// directory and then the working directory when there is no desktop.
pub fn default_store_path() -> PathBuf {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
        .join(DEFAULT_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.start_row, 4);
        assert_eq!(config.max_rows, 1000);
        assert_eq!(config.sheet_name, "Sheet1");
        assert!(config.path.ends_with("SmileOpsTables/Implants.xlsx"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = StoreConfig::from_toml_str(
            r#"
            path = "/tmp/clinic/Implants.xlsx"
            max_rows = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.path, PathBuf::from("/tmp/clinic/Implants.xlsx"));
        assert_eq!(config.max_rows, 20);
        assert_eq!(config.start_row, DEFAULT_START_ROW);
        assert_eq!(config.template_path, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            StoreConfig::from_toml_str("start_row = 2"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            StoreConfig::from_toml_str("max_rows = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            StoreConfig::from_toml_str("max_rows = \"many\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_blank_layout_follows_start_row() {
        let mut config = StoreConfig::at("/tmp/Implants.xlsx");
        config.start_row = 6;
        let layout = config.blank_layout();

        assert_eq!(layout.header_row, 5);
        assert_eq!(layout.group_row(), Some(4));
        assert_eq!(layout.headers.len(), 27);
    }

    #[test]
    fn test_xlsx_source_carries_paths() {
        let config = StoreConfig::at("/tmp/Implants.xlsx");
        assert_eq!(config.xlsx_source().path(), Path::new("/tmp/Implants.xlsx"));
    }
}
