//! CSV loader for long-form statistics tables

use crate::error::{Error, Result};
use crate::table::{columns, parse_value, parse_year, LongRow, LongTable};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Load a CSV file into a LongTable
///
/// Columns are matched by header name, so extra columns and any column order
/// are accepted. A missing `Year`, `Area`, `Variable` or `Value` header fails
/// with [`Error::MalformedTable`].
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<LongTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let table = parse_reader(BufReader::new(file), path.to_path_buf())?;
    debug!(path = %path.display(), rows = table.row_count(), "loaded table");
    Ok(table)
}

/// Parse CSV from a string (useful for testing)
pub fn parse_table_str(content: &str, source_name: &str) -> Result<LongTable> {
    parse_reader(content.as_bytes(), PathBuf::from(source_name))
}

/// Header positions of the four required columns
struct ColumnMap {
    year: usize,
    area: usize,
    variable: usize,
    value: usize,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord, path: &Path) -> Result<Self> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();

        let position = |column: &str| {
            names
                .iter()
                .position(|name| *name == column)
                .ok_or_else(|| Error::MalformedTable {
                    path: path.to_path_buf(),
                    column: column.to_string(),
                })
        };

        Ok(Self {
            year: position(columns::YEAR)?,
            area: position(columns::AREA)?,
            variable: position(columns::VARIABLE)?,
            value: position(columns::VALUE)?,
        })
    }
}

fn parse_reader<R: Read>(reader: R, path: PathBuf) -> Result<LongTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Allow varying number of fields
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| Error::Csv {
        path: path.clone(),
        source: e,
    })?;
    let column_map = ColumnMap::from_headers(headers, &path)?;
    let header_len = headers.len();

    let mut table = LongTable::new(path);
    for (row_idx, result) in csv_reader.records().enumerate() {
        // 1-based, and the header occupies line 1
        let row_number = row_idx + 2;
        let record = result.map_err(|e| Error::Csv {
            path: table.source_path.clone(),
            source: e,
        })?;

        if record.len() > header_len {
            warn!(
                path = %table.source_path.display(),
                row = row_number,
                "row has more cells than columns, ignoring the extra cells"
            );
        }

        // Short rows read their missing cells as empty
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let invalid = |column: &str, raw: &str| Error::InvalidValue {
            path: table.source_path.clone(),
            row: row_number,
            column: column.to_string(),
            raw: raw.to_string(),
        };

        let raw_year = cell(column_map.year);
        let year = parse_year(raw_year).ok_or_else(|| invalid(columns::YEAR, raw_year))?;

        let raw_value = cell(column_map.value);
        let value = parse_value(raw_value).map_err(|_| invalid(columns::VALUE, raw_value))?;

        let row = LongRow::new(
            year,
            cell(column_map.area).trim(),
            cell(column_map.variable).trim(),
            value,
        );
        table.rows.push(row);
    }

    Ok(table)
}
