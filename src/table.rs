//! Tabular customer data sources.
//!
//! A [`TableSource`] yields a [`RawTable`]: named columns plus rows of loosely
//! typed cells, exactly as a spreadsheet reader hands them over. Turning those
//! cells into customer records is the normalizer's job.

use crate::errors::{AppError, ResultExt};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::{Path, PathBuf};

/// A single spreadsheet cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
}

impl Cell {
    /// Renders the cell as text. Integral floats print without a fractional part.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) if n.is_finite() => n.to_string(),
            Cell::Number(_) => String::new(),
            Cell::Int(i) => i.to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Int(*i),
            Data::Bool(b) => Cell::Bool(*b),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Header row plus data rows. Rows may be shorter than the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let columns = columns.into_iter().map(|c| c.trim().to_string()).collect();
        Self { columns, rows }
    }

    /// Position of a column by its trimmed header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Anything that can produce the customer table on demand.
pub trait TableSource: Send + Sync {
    fn load(&self) -> Result<RawTable, AppError>;

    /// Human-readable origin, used in logs.
    fn describe(&self) -> String {
        "in-memory table".to_string()
    }
}

impl TableSource for RawTable {
    fn load(&self) -> Result<RawTable, AppError> {
        Ok(self.clone())
    }
}

/// Reads one worksheet of an Excel/ODS workbook. The first row is the header.
#[derive(Debug, Clone)]
pub struct ExcelSource {
    path: PathBuf,
    sheet: String,
}

impl ExcelSource {
    pub fn new(path: impl AsRef<Path>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheet: sheet.into(),
        }
    }
}

impl TableSource for ExcelSource {
    fn load(&self) -> Result<RawTable, AppError> {
        if !self.path.exists() {
            return Err(AppError::DataUnavailable(format!(
                "workbook not found: {}",
                self.path.display()
            )));
        }

        let mut workbook = open_workbook_auto(&self.path)
            .map_err(AppError::from)
            .with_context(|| format!("opening workbook {}", self.path.display()))?;

        if !workbook.sheet_names().iter().any(|name| name == &self.sheet) {
            return Err(AppError::DataUnavailable(format!(
                "sheet '{}' not found in {}",
                self.sheet,
                self.path.display()
            )));
        }

        let range = workbook
            .worksheet_range(&self.sheet)
            .map_err(AppError::from)
            .with_context(|| {
                format!("reading sheet '{}' from {}", self.sheet, self.path.display())
            })?;
        let mut rows = range.rows();

        let columns: Vec<String> = match rows.next() {
            Some(header) => header.iter().map(|c| Cell::from(c).as_text()).collect(),
            None => Vec::new(),
        };
        let rows = rows
            .map(|row| row.iter().map(Cell::from).collect())
            .collect::<Vec<Vec<Cell>>>();

        let table = RawTable::new(columns, rows);
        tracing::debug!(
            "Read {} rows x {} columns from sheet '{}'",
            table.len(),
            table.columns.len(),
            self.sheet
        );

        Ok(table)
    }

    fn describe(&self) -> String {
        format!("{} [{}]", self.path.display(), self.sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text_rendering() {
        assert_eq!(Cell::Number(12345678.0).as_text(), "12345678");
        assert_eq!(Cell::Number(1.5).as_text(), "1.5");
        assert_eq!(Cell::Int(42).as_text(), "42");
        assert_eq!(Cell::Empty.as_text(), "");
        assert_eq!(Cell::Number(f64::NAN).as_text(), "");
        assert_eq!(Cell::from(" x ").as_text(), " x ");
    }

    #[test]
    fn test_calamine_cells_convert() {
        assert_eq!(Cell::from(&Data::Float(55551111.0)), Cell::Number(55551111.0));
        assert_eq!(
            Cell::from(&Data::String("Ana".to_string())),
            Cell::Text("Ana".to_string())
        );
        assert_eq!(Cell::from(&Data::Empty), Cell::Empty);
    }

    #[test]
    fn test_headers_are_trimmed() {
        let table = RawTable::new(vec![" DPI ".to_string(), "NIT".to_string()], vec![]);
        assert_eq!(table.column_index("DPI"), Some(0));
        assert_eq!(table.column_index("NIT"), Some(1));
        assert_eq!(table.column_index("EMAIL"), None);
    }

    #[test]
    fn test_missing_workbook_is_data_unavailable() {
        let source = ExcelSource::new("/nonexistent/Plantilla_Basedatos.xlsx", "Base tel");
        let err = source.load().unwrap_err();
        assert!(matches!(err, AppError::DataUnavailable(_)));
    }

    #[test]
    fn test_corrupt_workbook_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Plantilla_Basedatos.xlsx");
        std::fs::write(&path, "NOMBRE_CLIENTE,DPI\nAna,123\n").unwrap();

        let err = ExcelSource::new(&path, "Base tel").load().unwrap_err();

        assert!(matches!(err, AppError::WithContext { .. }));
        assert!(matches!(err.root(), AppError::DataUnavailable(_)));
        assert!(err
            .to_string()
            .starts_with(&format!("opening workbook {}: Data unavailable:", path.display())));
    }
}
