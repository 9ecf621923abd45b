//! awe-core: Core library for deriving Agricultural Water Efficiency from AQUASTAT tables
//!
//! This library provides functionality to:
//! - Discover the CSV tables in a directory
//! - Load long-form (Year, Area, Variable, Value) rows from each table
//! - Merge all tables and pivot them into one row per (Year, Area)
//! - Derive `AWE_base`, `Cr` and `Awe` from the wide columns
//! - Report the run and write the result table

pub mod config;
pub mod error;
pub mod merger;
pub mod metric;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod reshape;
pub mod scanner;
pub mod table;

pub use config::RunConfig;
pub use error::{Error, Result};
pub use merger::{load_all, merge_tables, MergedTable};
pub use metric::{
    derive, Capabilities, DerivedRow, DerivedTable, OutputRow, EFFICIENCY_VARIABLE,
    WITHDRAWAL_VARIABLE,
};
pub use parser::{load_table, parse_table_str};
pub use pipeline::{run, run_and_report, RunOutcome, RunResult};
pub use report::{write_output, Projection, Report, Results, Summary};
pub use reshape::{pivot, pivot_rows, WideRow, WideTable};
pub use scanner::discover_tables;
pub use table::{LongRow, LongTable};
