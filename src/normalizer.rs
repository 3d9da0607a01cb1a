//! Raw table → normalized records.
//!
//! Column names are a fixed external contract: `NOMBRE_CLIENTE`, `DPI`, `NIT`,
//! `EMAIL`, `Tel_1`..`Tel_5`, plus the optional `ID` and `FECHA_NACIMIENTO`.
//! Missing columns read as empty strings.

use crate::errors::AppError;
use crate::models::{Record, RecordFields};
use crate::store::RecordStore;
use crate::table::{Cell, RawTable, TableSource};

pub const COL_NAME: &str = "NOMBRE_CLIENTE";
pub const COL_NATIONAL_ID: &str = "DPI";
pub const COL_TAX_ID: &str = "NIT";
pub const COL_EMAIL: &str = "EMAIL";
pub const COL_ID: &str = "ID";
pub const COL_BIRTH_DATE: &str = "FECHA_NACIMIENTO";
pub const PHONE_COLUMNS: [&str; 5] = ["Tel_1", "Tel_2", "Tel_3", "Tel_4", "Tel_5"];

/// Canonical form of a DPI/NIT: trimmed, one trailing `.0` removed, no whitespace.
pub fn normalize_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    stripped.chars().filter(|c| !c.is_whitespace()).collect()
}

struct ColumnMap {
    id: Option<usize>,
    name: Option<usize>,
    national_id: Option<usize>,
    tax_id: Option<usize>,
    email: Option<usize>,
    birth_date: Option<usize>,
    phones: [Option<usize>; 5],
}

impl ColumnMap {
    fn resolve(table: &RawTable) -> Self {
        let map = Self {
            id: table.column_index(COL_ID),
            name: table.column_index(COL_NAME),
            national_id: table.column_index(COL_NATIONAL_ID),
            tax_id: table.column_index(COL_TAX_ID),
            email: table.column_index(COL_EMAIL),
            birth_date: table.column_index(COL_BIRTH_DATE),
            phones: PHONE_COLUMNS.map(|c| table.column_index(c)),
        };

        for (column, index) in [
            (COL_NAME, map.name),
            (COL_NATIONAL_ID, map.national_id),
            (COL_TAX_ID, map.tax_id),
            (COL_EMAIL, map.email),
        ] {
            if index.is_none() {
                tracing::warn!("Column '{}' missing from source table, using empty values", column);
            }
        }

        map
    }
}

fn cell_text(row: &[Cell], index: Option<usize>) -> String {
    index
        .and_then(|i| row.get(i))
        .map(|cell| cell.as_text().trim().to_string())
        .unwrap_or_default()
}

fn optional_text(row: &[Cell], index: Option<usize>) -> Option<String> {
    Some(cell_text(row, index)).filter(|s| !s.is_empty())
}

/// Builds a record store from a raw table, preserving row order.
///
/// Rows whose mapped fields are all blank are skipped.
pub fn normalize(table: &RawTable) -> RecordStore {
    let columns = ColumnMap::resolve(table);
    let mut skipped = 0usize;

    let records: Vec<Record> = table
        .rows
        .iter()
        .filter_map(|row| {
            let fields = RecordFields {
                id: optional_text(row, columns.id),
                full_name: cell_text(row, columns.name),
                national_id: normalize_identifier(&cell_text(row, columns.national_id)),
                tax_id: normalize_identifier(&cell_text(row, columns.tax_id)),
                email: cell_text(row, columns.email),
                phones: columns.phones.iter().map(|i| cell_text(row, *i)).collect(),
                birth_date: optional_text(row, columns.birth_date),
            };

            let blank = fields.full_name.is_empty()
                && fields.national_id.is_empty()
                && fields.tax_id.is_empty()
                && fields.email.is_empty()
                && fields.phones.iter().all(|p| p.is_empty());
            if blank {
                skipped += 1;
                return None;
            }

            Some(Record::new(fields))
        })
        .collect();

    if skipped > 0 {
        tracing::debug!("Skipped {} blank rows", skipped);
    }

    RecordStore::new(records)
}

/// Loads and normalizes a table, degrading to an empty store when the source is unavailable.
pub fn load_store(source: &dyn TableSource) -> RecordStore {
    match source.load() {
        Ok(table) => {
            if table.is_empty() {
                tracing::warn!("{} has a header but no data rows", source.describe());
            }
            let store = normalize(&table);
            tracing::info!(
                "Loaded {} records from {}",
                store.len(),
                source.describe()
            );
            store
        }
        Err(e) if matches!(e.root(), AppError::DataUnavailable(_)) => {
            tracing::warn!("⚠ Customer table unavailable ({}), starting with 0 rows", e);
            RecordStore::empty()
        }
        Err(e) => {
            tracing::error!("Failed to load customer table from {}: {}", source.describe(), e);
            RecordStore::empty()
        }
    }
}
