//! Single-run entry point: discover, load, merge, reshape, derive, persist

use crate::config::RunConfig;
use crate::error::Result;
use crate::merger::{load_all, merge_tables};
use crate::metric::derive;
use crate::report::{write_output, Report, Results};
use crate::reshape::pivot;
use crate::scanner::discover_tables;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// The directory had no input tables
    NoInputFiles,
    /// Inputs were processed but `Awe` could not be derived
    WithoutOutput,
    /// `Awe` was derived and written to `path`
    WithOutput { path: PathBuf, rows: usize },
}

/// Result of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub directory: PathBuf,
    /// Input files in merge order
    pub files: Vec<PathBuf>,
    pub outcome: RunOutcome,
    pub report: Report,
}

/// Run the pipeline over every input table in `dir`
///
/// Every file is loaded before anything is written, so a malformed file aborts
/// the run with the previous results file untouched.
pub fn run<P: AsRef<Path>>(dir: P, config: &RunConfig) -> Result<RunResult> {
    let dir = dir.as_ref();

    let files = discover_tables(dir, config)?;
    if files.is_empty() {
        info!(dir = %dir.display(), "no input files found");
        return Ok(RunResult {
            directory: dir.to_path_buf(),
            files,
            outcome: RunOutcome::NoInputFiles,
            report: Report::no_input(dir),
        });
    }
    info!(dir = %dir.display(), files = files.len(), "discovered input tables");

    let tables = load_all(&files)?;
    let merged = merge_tables(tables);
    let wide = pivot(&merged);
    let derived = derive(&wide);

    let (outcome, results) = match derived.output_rows() {
        Some(rows) => {
            let path = dir.join(&config.output_file_name);
            write_output(&path, &rows)?;
            let outcome = RunOutcome::WithOutput {
                path: path.clone(),
                rows: rows.len(),
            };
            (outcome, Some(Results { rows, output_path: path }))
        }
        None => {
            info!("metric inputs missing, skipping results file");
            (RunOutcome::WithoutOutput, None)
        }
    };

    let report = Report::build(dir, &merged, &wide, &derived, results, config.preview_rows);

    Ok(RunResult {
        directory: dir.to_path_buf(),
        files,
        outcome,
        report,
    })
}

/// Run the pipeline and write its report to `out`
///
/// Nothing reaches `out` unless the run succeeds.
pub fn run_and_report<P: AsRef<Path>, W: Write>(
    dir: P,
    config: &RunConfig,
    out: &mut W,
) -> Result<RunResult> {
    let result = run(dir, config)?;
    result.report.render(out)?;
    Ok(result)
}
