//! Console report and result file

use crate::error::{Error, Result};
use crate::merger::MergedTable;
use crate::metric::{
    columns, Capabilities, DerivedRow, DerivedTable, OutputRow, EFFICIENCY_VARIABLE,
    WITHDRAWAL_VARIABLE,
};
use crate::reshape::WideTable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const RULE_WIDTH: usize = 80;

/// Everything a run prints, collected before anything is printed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Directory that was scanned
    pub directory: PathBuf,
    /// `None` when the directory had no input tables
    pub summary: Option<Summary>,
}

/// Report content for a run that found input tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Number of files merged
    pub files: usize,
    /// Total row count after merge
    pub row_count: usize,
    /// Distinct years, ascending
    pub years: Vec<i32>,
    /// Distinct variables, in first-seen order
    pub variables: Vec<String>,
    /// Leading rows of the wide table
    pub preview: WideTable,
    /// Row count of the full wide table
    pub wide_rows: usize,
    pub capabilities: Capabilities,
    /// Present only when `Awe` was computed
    pub results: Option<Results>,
    /// Derived columns that could be computed, when `Awe` could not
    pub partial: Option<Projection>,
}

/// Computed `Awe` table and where it was written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Results {
    pub rows: Vec<OutputRow>,
    pub output_path: PathBuf,
}

/// Derived rows restricted to the columns the dataset supports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projection {
    pub columns: Vec<String>,
    pub rows: Vec<DerivedRow>,
}

impl Report {
    /// Report for a directory with no input tables
    pub fn no_input(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            summary: None,
        }
    }

    /// Build the report for a completed run
    ///
    /// `results` carries the rows already written by the run, if any.
    pub fn build(
        directory: impl Into<PathBuf>,
        merged: &MergedTable,
        wide: &WideTable,
        derived: &DerivedTable,
        results: Option<Results>,
        preview_rows: usize,
    ) -> Self {
        let partial = results.is_none().then(|| Projection {
            columns: derived.columns().into_iter().map(str::to_string).collect(),
            rows: derived.rows.clone(),
        });

        let preview = WideTable {
            variables: wide.variables.clone(),
            rows: wide.rows.iter().take(preview_rows).cloned().collect(),
        };

        Self {
            directory: directory.into(),
            summary: Some(Summary {
                files: merged.sources.len(),
                row_count: merged.row_count(),
                years: merged.years(),
                variables: merged.variables().into_iter().map(str::to_string).collect(),
                preview,
                wide_rows: wide.row_count(),
                capabilities: derived.capabilities,
                results,
                partial,
            }),
        }
    }

    /// Write the report as plain text
    pub fn render<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let Some(summary) = &self.summary else {
            writeln!(w, "No input files found in {}", self.directory.display())?;
            return Ok(());
        };

        writeln!(w, "Total rows loaded: {}", summary.row_count)?;
        let years: Vec<String> = summary.years.iter().map(i32::to_string).collect();
        writeln!(w, "Years available: [{}]", years.join(", "))?;
        writeln!(w)?;
        writeln!(w, "Available variables:")?;
        for variable in &summary.variables {
            writeln!(w, "  - {}", variable)?;
        }

        writeln!(w)?;
        writeln!(w, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(w, "Data structure:")?;
        render_preview(w, &summary.preview, summary.wide_rows)?;

        match &summary.results {
            Some(results) => render_results(w, results)?,
            None => render_insufficient(w, &summary.capabilities, summary.partial.as_ref())?,
        }

        writeln!(w)?;
        writeln!(w, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(w, "Note: To calculate precise Awe, please provide:")?;
        writeln!(w, "  - GVA_a: Gross Value Added from agriculture (in currency units)")?;
        writeln!(w, "  - Cr: Crop water requirement coefficient or efficiency factor")?;
        writeln!(w, "  - Va: Volume of agricultural water use (in m³)")?;

        Ok(())
    }
}

fn render_preview<W: Write>(w: &mut W, preview: &WideTable, total_rows: usize) -> io::Result<()> {
    let mut header = vec!["Year", "Area"];
    header.extend(preview.variables.iter().map(String::as_str));
    writeln!(w, "{}", header.join("\t"))?;
    writeln!(w, "{}", "-".repeat(header.len() * 12))?;

    for row in &preview.rows {
        let mut values = vec![row.year.to_string(), row.area.clone()];
        values.extend(
            preview
                .variables
                .iter()
                .map(|v| format_optional(row.value(v))),
        );
        writeln!(w, "{}", values.join("\t"))?;
    }

    if total_rows > preview.rows.len() {
        writeln!(w, "... ({} more rows)", total_rows - preview.rows.len())?;
    }
    Ok(())
}

fn render_results<W: Write>(w: &mut W, results: &Results) -> io::Result<()> {
    writeln!(w)?;
    writeln!(w, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(w, "Agricultural Water Efficiency (Awe) calculated using formula:")?;
    writeln!(w, "Awe = (GVA_a × (1 - Cr)) / Va")?;
    writeln!(w)?;
    writeln!(w, "Where:")?;
    writeln!(w, "  - GVA_a/Va ratio approximated by Irrigated Agriculture Water Use Efficiency")?;
    writeln!(w, "  - Cr = Agricultural water withdrawal as % of total renewable resources")?;
    writeln!(w)?;
    writeln!(w, "Results:")?;
    writeln!(w, "Year\tArea\tCr\tAWE_base\tAwe")?;
    for row in &results.rows {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            row.year,
            row.area,
            format_optional(row.cr),
            format_optional(row.awe_base),
            format_optional(row.awe)
        )?;
    }
    writeln!(w)?;
    writeln!(w, "Results saved to: {}", results.output_path.display())?;
    Ok(())
}

fn render_insufficient<W: Write>(
    w: &mut W,
    capabilities: &Capabilities,
    partial: Option<&Projection>,
) -> io::Result<()> {
    writeln!(w)?;
    writeln!(w, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(w, "Insufficient data to calculate Awe; no results file was written.")?;
    if !capabilities.efficiency {
        writeln!(w, "  missing variable: {}", EFFICIENCY_VARIABLE)?;
    }
    if !capabilities.withdrawal {
        writeln!(w, "  missing variable: {}", WITHDRAWAL_VARIABLE)?;
    }

    // Only Year and Area means nothing was derivable
    let Some(partial) = partial.filter(|p| p.columns.len() > 2) else {
        return Ok(());
    };
    writeln!(w)?;
    writeln!(w, "Partial results:")?;
    writeln!(w, "{}", partial.columns.join("\t"))?;
    for row in &partial.rows {
        let values: Vec<String> = partial
            .columns
            .iter()
            .map(|column| projected_cell(row, column))
            .collect();
        writeln!(w, "{}", values.join("\t"))?;
    }
    Ok(())
}

fn projected_cell(row: &DerivedRow, column: &str) -> String {
    match column {
        columns::AWE_BASE => format_optional(row.awe_base),
        columns::CR => format_optional(row.cr),
        columns::AWE => format_optional(row.awe),
        crate::table::columns::YEAR => row.year.to_string(),
        _ => row.area.clone(),
    }
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write the result table, replacing any previous file at `path`
///
/// Rows go to a hidden sibling file first, which is then renamed over `path`,
/// so a failed write leaves the previous results intact.
pub fn write_output(path: &Path, rows: &[OutputRow]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    if let Err(e) = write_rows(&tmp_path, rows) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    fs::rename(&tmp_path, path)?;

    info!(path = %path.display(), rows = rows.len(), "wrote results");
    Ok(())
}

fn write_rows(path: &Path, rows: &[OutputRow]) -> Result<()> {
    let csv_error = |source: csv::Error| Error::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    if rows.is_empty() {
        writer
            .write_record(["Year", "Area", "Cr", "AWE_base", "Awe"])
            .map_err(csv_error)?;
    }
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}
