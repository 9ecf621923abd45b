//! Pivot from long form (Year, Area, Variable, Value) to one row per (Year, Area)
//!
//! When several rows share a (Year, Area, Variable) triple, the first present
//! value in merge order wins and the others are dropped. Nothing decides which
//! of two conflicting observations is right; the policy only makes repeated
//! runs over the same files agree.

use crate::merger::MergedTable;
use crate::table::LongRow;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// One (Year, Area) entity with a value per observed variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WideRow {
    pub year: i32,
    pub area: String,
    /// Present values only; a variable missing here is absent for this row
    pub values: BTreeMap<String, f64>,
}

impl WideRow {
    /// Create a row with no values
    pub fn new(year: i32, area: impl Into<String>) -> Self {
        Self {
            year,
            area: area.into(),
            values: BTreeMap::new(),
        }
    }

    /// Value of `variable` for this row, if present
    pub fn value(&self, variable: &str) -> Option<f64> {
        self.values.get(variable).copied()
    }
}

/// Wide table keyed by (Year, Area)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WideTable {
    /// Every distinct variable in the dataset, sorted
    pub variables: Vec<String>,
    /// Rows ordered by (Year, Area)
    pub rows: Vec<WideRow>,
}

impl WideTable {
    /// Whether the dataset contains `variable` at all
    pub fn has_variable(&self, variable: &str) -> bool {
        self.variables.iter().any(|v| v == variable)
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Long-form equivalent of this table
    ///
    /// Emits one row per (entity, variable) pair, with `None` where the entity
    /// has no value, so the column set survives a round trip.
    pub fn to_long(&self) -> Vec<LongRow> {
        self.rows
            .iter()
            .flat_map(|row| {
                self.variables.iter().map(move |variable| {
                    LongRow::new(row.year, row.area.clone(), variable.clone(), row.value(variable))
                })
            })
            .collect()
    }
}

/// Pivot a merged table into a wide table
pub fn pivot(merged: &MergedTable) -> WideTable {
    pivot_rows(&merged.rows)
}

/// Pivot long rows into a wide table
pub fn pivot_rows(rows: &[LongRow]) -> WideTable {
    let mut variables: BTreeSet<&str> = BTreeSet::new();
    let mut groups: BTreeMap<(i32, &str), BTreeMap<String, f64>> = BTreeMap::new();
    let mut discarded = 0usize;

    for row in rows {
        variables.insert(row.variable.as_str());
        let values = groups.entry((row.year, row.area.as_str())).or_default();

        let Some(value) = row.value else {
            continue;
        };
        match values.entry(row.variable.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(kept) => {
                discarded += 1;
                debug!(
                    year = row.year,
                    area = %row.area,
                    variable = %row.variable,
                    kept = *kept.get(),
                    dropped = value,
                    "duplicate observation, keeping first value"
                );
            }
        }
    }

    if discarded > 0 {
        info!(discarded, "dropped duplicate observations while reshaping");
    }

    WideTable {
        variables: variables.into_iter().map(str::to_string).collect(),
        rows: groups
            .into_iter()
            .map(|((year, area), values)| WideRow {
                year,
                area: area.to_string(),
                values,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::merge_tables;
    use crate::parser::parse_table_str;

    fn merged(files: &[(&str, &str)]) -> MergedTable {
        merge_tables(
            files
                .iter()
                .map(|(name, csv)| parse_table_str(csv, name).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_pivot_groups_by_year_and_area() {
        let table = merged(&[(
            "a.csv",
            "Year,Area,Variable,Value\n2021,Y,Rain,1\n2020,X,Rain,2\n2020,X,Snow,3\n2020,Y,Snow,4\n",
        )]);
        let wide = pivot(&table);

        assert_eq!(wide.variables, vec!["Rain", "Snow"]);
        let keys: Vec<(i32, &str)> = wide.rows.iter().map(|r| (r.year, r.area.as_str())).collect();
        assert_eq!(keys, vec![(2020, "X"), (2020, "Y"), (2021, "Y")]);

        assert_eq!(wide.rows[0].value("Rain"), Some(2.0));
        assert_eq!(wide.rows[0].value("Snow"), Some(3.0));
        assert_eq!(wide.rows[1].value("Rain"), None);
        assert_eq!(wide.rows[2].value("Snow"), None);
    }

    #[test]
    fn test_first_value_wins_across_files() {
        let table = merged(&[
            ("a.csv", "Year,Area,Variable,Value\n2020,X,Rain,1\n"),
            ("b.csv", "Year,Area,Variable,Value\n2020,X,Rain,99\n"),
        ]);
        let wide = pivot(&table);

        assert_eq!(wide.row_count(), 1);
        assert_eq!(wide.rows[0].value("Rain"), Some(1.0));
    }

    #[test]
    fn test_absent_value_does_not_shadow_later_value() {
        let table = merged(&[(
            "a.csv",
            "Year,Area,Variable,Value\n2020,X,Rain,\n2020,X,Rain,7\n",
        )]);
        let wide = pivot(&table);

        assert_eq!(wide.rows[0].value("Rain"), Some(7.0));
    }

    #[test]
    fn test_nan_does_not_shadow_later_value() {
        let table = merged(&[(
            "a.csv",
            "Year,Area,Variable,Value\n2020,X,Rain,NaN\n2020,X,Rain,7\n2020,X,Snow,NA\n",
        )]);
        let wide = pivot(&table);

        assert_eq!(wide.rows[0].value("Rain"), Some(7.0));
        assert!(wide.has_variable("Snow"));
        assert_eq!(wide.rows[0].value("Snow"), None);
    }

    #[test]
    fn test_all_absent_group_still_has_row() {
        let table = merged(&[("a.csv", "Year,Area,Variable,Value\n2020,X,Rain,\n")]);
        let wide = pivot(&table);

        assert_eq!(wide.row_count(), 1);
        assert!(wide.has_variable("Rain"));
        assert_eq!(wide.rows[0].value("Rain"), None);
    }

    #[test]
    fn test_has_variable_is_dataset_wide() {
        let table = merged(&[(
            "a.csv",
            "Year,Area,Variable,Value\n2020,X,Rain,1\n2020,Y,Snow,2\n",
        )]);
        let wide = pivot(&table);

        assert!(wide.has_variable("Snow"));
        assert!(!wide.has_variable("Wind"));
        // Dataset has Snow, but row X does not
        assert_eq!(wide.rows[0].value("Snow"), None);
    }

    #[test]
    fn test_pivot_is_idempotent() {
        let table = merged(&[
            (
                "a.csv",
                "Year,Area,Variable,Value\n2020,X,Rain,1\n2020,X,Rain,5\n2021,Y,Snow,\n",
            ),
            ("b.csv", "Year,Area,Variable,Value\n2020,Y,Snow,2\n2021,X,Rain,3\n"),
        ]);
        let once = pivot(&table);
        let twice = pivot_rows(&once.to_long());
        let thrice = pivot_rows(&twice.to_long());

        assert_eq!(once, twice);
        assert_eq!(twice, thrice);
    }

    #[test]
    fn test_pivot_empty() {
        let wide = pivot(&MergedTable::default());
        assert!(wide.variables.is_empty());
        assert_eq!(wide.row_count(), 0);
    }
}
