//! Agricultural Water Efficiency (Awe) derivation
//!
//! The full formula is `Awe = GVA_a * (1 - Cr) / Va`. The inputs only carry the
//! irrigated water use efficiency indicator, which stands in for the
//! `GVA_a / Va` ratio, so the computed form is `Awe = AWE_base * (1 - Cr)`.
//!
//! Inputs are not range checked. A withdrawal above 100% gives `Cr > 1` and a
//! negative `Awe`.

use crate::reshape::WideTable;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Source column for `AWE_base`
pub const EFFICIENCY_VARIABLE: &str = "SDG 6.4.1. Irrigated Agriculture Water Use Efficiency";

/// Source column for `Cr`, in percent
pub const WITHDRAWAL_VARIABLE: &str =
    "Agricultural water withdrawal as % of total renewable water resources";

/// Header names of the derived columns
pub mod columns {
    pub const AWE_BASE: &str = "AWE_base";
    pub const CR: &str = "Cr";
    pub const AWE: &str = "Awe";
}

/// Which derived columns the dataset can support
///
/// Decided once per dataset, before any row is looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// The efficiency variable occurs somewhere in the dataset
    pub efficiency: bool,
    /// The withdrawal variable occurs somewhere in the dataset
    pub withdrawal: bool,
}

impl Capabilities {
    pub fn of(table: &WideTable) -> Self {
        Self {
            efficiency: table.has_variable(EFFICIENCY_VARIABLE),
            withdrawal: table.has_variable(WITHDRAWAL_VARIABLE),
        }
    }

    /// Both inputs of `Awe` exist
    pub fn awe(&self) -> bool {
        self.efficiency && self.withdrawal
    }
}

/// Derived values for one (Year, Area) row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRow {
    pub year: i32,
    pub area: String,
    pub awe_base: Option<f64>,
    pub cr: Option<f64>,
    pub awe: Option<f64>,
}

/// A row of the persisted result table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Area")]
    pub area: String,
    #[serde(rename = "Cr")]
    pub cr: Option<f64>,
    #[serde(rename = "AWE_base")]
    pub awe_base: Option<f64>,
    #[serde(rename = "Awe")]
    pub awe: Option<f64>,
}

/// Derived columns for every row of a wide table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedTable {
    pub capabilities: Capabilities,
    /// Same order as the wide table rows
    pub rows: Vec<DerivedRow>,
}

impl DerivedTable {
    /// Whether `Awe` was computed for this dataset
    pub fn awe_available(&self) -> bool {
        self.capabilities.awe()
    }

    /// Columns of the output projection that exist for this dataset
    pub fn columns(&self) -> Vec<&'static str> {
        let mut cols = vec![crate::table::columns::YEAR, crate::table::columns::AREA];
        if self.capabilities.withdrawal {
            cols.push(columns::CR);
        }
        if self.capabilities.efficiency {
            cols.push(columns::AWE_BASE);
        }
        if self.capabilities.awe() {
            cols.push(columns::AWE);
        }
        cols
    }

    /// Rows to persist, or `None` when `Awe` could not be computed
    pub fn output_rows(&self) -> Option<Vec<OutputRow>> {
        if !self.awe_available() {
            return None;
        }

        Some(
            self.rows
                .iter()
                .map(|row| OutputRow {
                    year: row.year,
                    area: row.area.clone(),
                    cr: row.cr,
                    awe_base: row.awe_base,
                    awe: row.awe,
                })
                .collect(),
        )
    }

    /// Number of rows with an `Awe` value
    pub fn awe_count(&self) -> usize {
        self.rows.iter().filter(|r| r.awe.is_some()).count()
    }
}

/// Convert a withdrawal percentage into the `Cr` fraction
pub fn withdrawal_coefficient(withdrawal_pct: f64) -> f64 {
    withdrawal_pct / 100.0
}

/// `Awe` for one row, present only when both inputs are
pub fn compute(awe_base: Option<f64>, cr: Option<f64>) -> Option<f64> {
    Some(awe_base? * (1.0 - cr?))
}

/// Derive `AWE_base`, `Cr` and `Awe` for every row
///
/// A column whose source variable never occurs in the dataset stays `None` on
/// every row. A source value missing on a single row only affects that row.
pub fn derive(table: &WideTable) -> DerivedTable {
    let capabilities = Capabilities::of(table);

    let rows: Vec<DerivedRow> = table
        .rows
        .iter()
        .map(|row| {
            let awe_base = if capabilities.efficiency {
                row.value(EFFICIENCY_VARIABLE)
            } else {
                None
            };
            let cr = if capabilities.withdrawal {
                row.value(WITHDRAWAL_VARIABLE).map(withdrawal_coefficient)
            } else {
                None
            };
            let awe = if capabilities.awe() {
                compute(awe_base, cr)
            } else {
                None
            };

            DerivedRow {
                year: row.year,
                area: row.area.clone(),
                awe_base,
                cr,
                awe,
            }
        })
        .collect();

    let derived = DerivedTable { capabilities, rows };
    info!(
        efficiency = capabilities.efficiency,
        withdrawal = capabilities.withdrawal,
        awe_rows = derived.awe_count(),
        "derived metric columns"
    );
    derived
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reshape::WideRow;

    const TOLERANCE: f64 = 1e-9;

    fn wide(rows: Vec<WideRow>) -> WideTable {
        let mut variables: Vec<String> = rows
            .iter()
            .flat_map(|r| r.values.keys().cloned())
            .collect();
        variables.sort();
        variables.dedup();
        WideTable { variables, rows }
    }

    fn row(year: i32, area: &str, efficiency: Option<f64>, withdrawal: Option<f64>) -> WideRow {
        let mut row = WideRow::new(year, area);
        if let Some(v) = efficiency {
            row.values.insert(EFFICIENCY_VARIABLE.to_string(), v);
        }
        if let Some(v) = withdrawal {
            row.values.insert(WITHDRAWAL_VARIABLE.to_string(), v);
        }
        row
    }

    #[test]
    fn test_compute_formula() {
        let awe = compute(Some(0.8), Some(0.4)).unwrap();
        assert!((awe - 0.48).abs() < TOLERANCE);
        assert_eq!(compute(None, Some(0.4)), None);
        assert_eq!(compute(Some(0.8), None), None);
    }

    #[test]
    fn test_withdrawal_coefficient() {
        assert!((withdrawal_coefficient(40.0) - 0.4).abs() < TOLERANCE);
        assert_eq!(withdrawal_coefficient(0.0), 0.0);
    }

    #[test]
    fn test_derive_full_row() {
        let derived = derive(&wide(vec![row(2020, "X", Some(0.8), Some(40.0))]));

        assert!(derived.awe_available());
        let r = &derived.rows[0];
        assert_eq!(r.awe_base, Some(0.8));
        assert!((r.cr.unwrap() - 0.4).abs() < TOLERANCE);
        assert!((r.awe.unwrap() - 0.48).abs() < TOLERANCE);
    }

    #[test]
    fn test_row_missing_input_gives_none() {
        let derived = derive(&wide(vec![
            row(2020, "X", Some(0.8), Some(40.0)),
            row(2020, "Y", Some(0.5), None),
            row(2021, "X", None, Some(10.0)),
        ]));

        assert!(derived.awe_available());
        assert_eq!(derived.awe_count(), 1);
        assert_eq!(derived.rows[1].awe_base, Some(0.5));
        assert_eq!(derived.rows[1].cr, None);
        assert_eq!(derived.rows[1].awe, None);
        assert_eq!(derived.rows[2].awe_base, None);
        assert!((derived.rows[2].cr.unwrap() - 0.1).abs() < TOLERANCE);
        assert_eq!(derived.rows[2].awe, None);
    }

    #[test]
    fn test_missing_withdrawal_column() {
        let derived = derive(&wide(vec![row(2020, "X", Some(0.8), None)]));

        assert!(!derived.awe_available());
        assert_eq!(derived.columns(), vec!["Year", "Area", "AWE_base"]);
        assert_eq!(derived.rows[0].awe_base, Some(0.8));
        assert!(derived.output_rows().is_none());
    }

    #[test]
    fn test_missing_efficiency_column() {
        let derived = derive(&wide(vec![row(2020, "X", None, Some(40.0))]));

        assert!(!derived.awe_available());
        assert_eq!(derived.columns(), vec!["Year", "Area", "Cr"]);
        assert_eq!(derived.rows[0].awe, None);
    }

    #[test]
    fn test_output_columns_when_available() {
        let derived = derive(&wide(vec![row(2020, "X", Some(0.8), Some(40.0))]));
        assert_eq!(derived.columns(), vec!["Year", "Area", "Cr", "AWE_base", "Awe"]);

        let out = derived.output_rows().unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].area, "X");
    }

    // Inputs are not range checked; out-of-domain percentages flow through.
    #[test]
    fn test_withdrawal_over_100_percent_is_not_clamped() {
        let derived = derive(&wide(vec![row(2020, "X", Some(0.8), Some(150.0))]));

        let r = &derived.rows[0];
        assert!((r.cr.unwrap() - 1.5).abs() < TOLERANCE);
        assert!((r.awe.unwrap() - (-0.4)).abs() < TOLERANCE);
    }

    #[test]
    fn test_negative_efficiency_is_not_rejected() {
        let derived = derive(&wide(vec![row(2020, "X", Some(-2.0), Some(50.0))]));
        assert!((derived.rows[0].awe.unwrap() - (-1.0)).abs() < TOLERANCE);
    }
}
