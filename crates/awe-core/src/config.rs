//! Run configuration

use serde::{Deserialize, Serialize};

/// Knobs for a single pipeline run
///
/// The CLI always runs with [`RunConfig::default`]; library callers and tests
/// can override individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Extension (without the dot) of input tables, compared case-insensitively
    pub extension: String,
    /// File name of the result table, written inside the input directory
    pub output_file_name: String,
    /// Number of wide rows shown in the report preview
    pub preview_rows: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            extension: "csv".to_string(),
            output_file_name: "awe_results.csv".to_string(),
            preview_rows: 5,
        }
    }
}
