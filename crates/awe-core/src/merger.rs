//! Concatenation of per-file tables into one long-form table

use crate::error::Result;
use crate::parser::load_table;
use crate::table::{LongRow, LongTable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::info;

/// All rows of a run, in merge order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergedTable {
    /// Rows from every source, file by file
    pub rows: Vec<LongRow>,
    /// Files that contributed to this table, in merge order
    pub sources: Vec<PathBuf>,
}

impl MergedTable {
    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Distinct years, ascending
    pub fn years(&self) -> Vec<i32> {
        self.rows
            .iter()
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct variable names in the order they first appear
    pub fn variables(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|r| r.variable.as_str())
            .filter(|v| seen.insert(*v))
            .collect()
    }
}

/// Load every path in order, stopping at the first file that fails
pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<LongTable>> {
    paths.iter().map(load_table).collect()
}

/// Concatenate tables in the given order
///
/// Rows are kept exactly as loaded; duplicates are left for the reshaper.
pub fn merge_tables(tables: Vec<LongTable>) -> MergedTable {
    let mut merged = MergedTable::default();

    for table in tables {
        merged.sources.push(table.source_path);
        merged.rows.extend(table.rows);
    }

    info!(
        files = merged.sources.len(),
        rows = merged.row_count(),
        "merged input tables"
    );
    merged
}
