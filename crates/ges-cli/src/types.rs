use std::path::{Path, PathBuf};

use ges_core::{ReconcileOutput, RunStats};
use serde::Serialize;

/// Outcome of one `run`, printed as a table and optionally saved as JSON.
#[derive(Debug, Serialize)]
pub struct RunResult {
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub inputs: Vec<InputFile>,
    pub tables: TableCounts,
    pub stats: RunStats,
    /// Every file written, parts included. Empty on a dry run.
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputFile {
    pub table: &'static str,
    pub path: PathBuf,
    pub rows: usize,
}

impl InputFile {
    pub fn new(table: &'static str, path: &Path, rows: usize) -> Self {
        Self {
            table,
            path: path.to_path_buf(),
            rows,
        }
    }
}

/// Row counts of the produced tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    /// `None` when the input table was not supplied.
    pub visits: Option<usize>,
    pub medications: Option<usize>,
    pub review: usize,
    pub missing_dates: usize,
    pub cross_report: Option<usize>,
}

impl TableCounts {
    pub fn of(output: &ReconcileOutput) -> Self {
        Self {
            visits: output.visits.as_ref().map(Vec::len),
            medications: output.medications.as_ref().map(Vec::len),
            review: output.review.len(),
            missing_dates: output.missing_dates.len(),
            cross_report: output.cross_report.as_ref().map(Vec::len),
        }
    }
}
