//! Long-form table types shared by the loader and the merger

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Header names of the fixed logical schema
pub mod columns {
    pub const YEAR: &str = "Year";
    pub const AREA: &str = "Area";
    pub const VARIABLE: &str = "Variable";
    pub const VALUE: &str = "Value";

    /// Required columns, in the order they are checked
    pub const REQUIRED: [&str; 4] = [YEAR, AREA, VARIABLE, VALUE];
}

/// A single (year, area, variable, value) observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRow {
    pub year: i32,
    /// Region or country identifier
    pub area: String,
    /// Metric name
    pub variable: String,
    /// `None` when the source cell was empty
    pub value: Option<f64>,
}

impl LongRow {
    /// Create a new row
    pub fn new(
        year: i32,
        area: impl Into<String>,
        variable: impl Into<String>,
        value: Option<f64>,
    ) -> Self {
        Self {
            year,
            area: area.into(),
            variable: variable.into(),
            value,
        }
    }
}

/// Rows parsed from a single input file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongTable {
    /// Rows in file order
    pub rows: Vec<LongRow>,
    /// Source file path
    pub source_path: PathBuf,
}

impl LongTable {
    /// Create a new empty table
    pub fn new(source_path: PathBuf) -> Self {
        Self {
            rows: Vec::new(),
            source_path,
        }
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Parse a year cell. Accepts integers and floats with no fractional part.
pub(crate) fn parse_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }

    // Spreadsheet exports sometimes write years as "2020.0"
    let float = trimmed.parse::<f64>().ok()?;
    if float.fract() == 0.0 && float >= i32::MIN as f64 && float <= i32::MAX as f64 {
        Some(float as i32)
    } else {
        None
    }
}

/// Tokens that mark a missing value, in addition to an empty cell
const MISSING_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "#N/A", "<NA>",
];

/// Parse a value cell. `Err(())` if not numeric.
///
/// Empty cells, missing-value markers and non-finite numbers are all absent.
pub(crate) fn parse_value(raw: &str) -> Result<Option<f64>, ()> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed) {
        return Ok(None);
    }
    let value = trimmed.parse::<f64>().map_err(|_| ())?;
    Ok(value.is_finite().then_some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_integer() {
        assert_eq!(parse_year("2020"), Some(2020));
        assert_eq!(parse_year(" 1999 "), Some(1999));
    }

    #[test]
    fn test_parse_year_whole_float() {
        assert_eq!(parse_year("2020.0"), Some(2020));
        assert_eq!(parse_year("2020.5"), None);
    }

    #[test]
    fn test_parse_year_rejects_text() {
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("twenty"), None);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("40"), Ok(Some(40.0)));
        assert_eq!(parse_value("-0.25"), Ok(Some(-0.25)));
        assert_eq!(parse_value("   "), Ok(None));
        assert_eq!(parse_value("lots"), Err(()));
    }

    #[test]
    fn test_parse_value_missing_markers_are_absent() {
        for raw in ["NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "#N/A"] {
            assert_eq!(parse_value(raw), Ok(None), "marker {raw:?}");
        }
    }

    #[test]
    fn test_parse_value_non_finite_is_absent() {
        assert_eq!(parse_value("inf"), Ok(None));
        assert_eq!(parse_value("-infinity"), Ok(None));
    }
}
