//! Output generation for GES reconciliation runs.
//!
//! Turns a [`ReconcileOutput`] into the two load files plus the optional
//! review, missing-date and cross-report files. File names are fixed so
//! that re-running on the same inputs overwrites the same files; a stamp
//! can be added to keep runs apart. Load files and the review and
//! missing-date tables are split into parts of at most 499 rows.

pub mod error;
pub mod frames;
pub mod writer;

use std::path::{Path, PathBuf};

use ges_core::ReconcileOutput;
use polars::prelude::DataFrame;
use tracing::{info, info_span, warn};

pub use error::{OutputError, Result};
pub use frames::{
    CROSS_REPORT_COLUMNS, LOAD_FILE_COLUMNS, MISSING_DATE_COLUMNS, REVIEW_COLUMNS,
    cross_report_frame, load_file_frame, missing_date_frame, review_frame,
};
pub use writer::{
    CsvOptions, DEFAULT_CHUNK_SIZE, part_path, render_csv, write_chunked, write_csv,
};

pub const VISITS_FILE: &str = "CARGA_CONSULTAS_GES.csv";
pub const MEDICATIONS_FILE: &str = "CARGA_MEDICAMENTOS_GES.csv";
pub const REVIEW_FILE: &str = "CASOS_REVISION_GES.csv";
pub const MISSING_DATE_FILE: &str = "MEDICAMENTOS_SIN_FECHA_GES.csv";
pub const CROSS_REPORT_FILE: &str = "ARCHIVO_CRUCE_GES.csv";

/// Separator of the cross report, whose cells hold `;`-joined lists.
pub const CROSS_REPORT_SEPARATOR: u8 = b'|';

#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub csv: CsvOptions,
    /// Suffix appended to every file stem, e.g. `20250301_101500`.
    pub stamp: Option<String>,
}

/// Paths written by one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenFiles {
    pub visits: Vec<PathBuf>,
    pub medications: Vec<PathBuf>,
    pub review: Vec<PathBuf>,
    pub missing_dates: Vec<PathBuf>,
    pub cross_report: Option<PathBuf>,
}

impl WrittenFiles {
    pub fn all(&self) -> impl Iterator<Item = &PathBuf> {
        self.visits
            .iter()
            .chain(&self.medications)
            .chain(&self.review)
            .chain(&self.missing_dates)
            .chain(&self.cross_report)
    }
}

/// File name with an optional stamp inserted before the extension.
pub fn output_file_name(base: &str, stamp: Option<&str>) -> String {
    match (stamp, base.rsplit_once('.')) {
        (Some(stamp), Some((stem, ext))) => format!("{stem}_{stamp}.{ext}"),
        (Some(stamp), None) => format!("{base}_{stamp}"),
        (None, _) => base.to_string(),
    }
}

fn single_file(mut df: DataFrame, path: PathBuf, separator: u8) -> Result<PathBuf> {
    write_csv(&mut df, &path, separator)?;
    Ok(path)
}

/// Write every table of a run into `dir`.
///
/// A load file is written (header-only when empty) only when its input
/// table was supplied; an absent input leaves any previous file in place.
/// Load files and the review and missing-date tables are split at the
/// configured chunk size; side tables are written only when they have rows.
pub fn write_outputs(
    output: &ReconcileOutput,
    dir: &Path,
    options: &OutputOptions,
) -> Result<WrittenFiles> {
    let _span = info_span!("write_outputs", dir = %dir.display()).entered();
    std::fs::create_dir_all(dir).map_err(|source| OutputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let stamp = options.stamp.as_deref();
    let path = |base: &str| dir.join(output_file_name(base, stamp));

    let mut written = WrittenFiles::default();
    match &output.visits {
        Some(records) => {
            written.visits =
                write_chunked(&load_file_frame(records)?, &path(VISITS_FILE), options.csv)?;
        }
        None => warn!(file = VISITS_FILE, "visit input not supplied, load file not written"),
    }
    match &output.medications {
        Some(records) => {
            written.medications = write_chunked(
                &load_file_frame(records)?,
                &path(MEDICATIONS_FILE),
                options.csv,
            )?;
        }
        None => warn!(
            file = MEDICATIONS_FILE,
            "medication inputs not supplied, load file not written"
        ),
    }
    if !output.review.is_empty() {
        written.review = write_chunked(
            &review_frame(&output.review)?,
            &path(REVIEW_FILE),
            options.csv,
        )?;
    }
    if !output.missing_dates.is_empty() {
        written.missing_dates = write_chunked(
            &missing_date_frame(&output.missing_dates)?,
            &path(MISSING_DATE_FILE),
            options.csv,
        )?;
    }
    if let Some(rows) = &output.cross_report {
        written.cross_report = Some(single_file(
            cross_report_frame(rows)?,
            path(CROSS_REPORT_FILE),
            CROSS_REPORT_SEPARATOR,
        )?);
    }

    info!(files = written.all().count(), "outputs written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_go_before_the_extension() {
        assert_eq!(output_file_name(VISITS_FILE, None), VISITS_FILE);
        assert_eq!(
            output_file_name(VISITS_FILE, Some("20250301_101500")),
            "CARGA_CONSULTAS_GES_20250301_101500.csv"
        );
    }
}
