//! Chunked CSV writing.
//!
//! The target billing system imports at most a fixed number of rows per
//! file, so large tables are split: the first part keeps the target name and
//! later parts are written next to it as `{stem}_part{n}{ext}`.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use polars::prelude::{CsvWriter, DataFrame, PolarsResult, SerWriter};
use tracing::debug;

use crate::error::{OutputError, Result};

/// Maximum data rows per load file accepted by the import.
pub const DEFAULT_CHUNK_SIZE: usize = 499;

#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    pub separator: u8,
    /// Maximum data rows per file.
    pub chunk_size: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Path of part `part` (1-based) of `target`.
pub fn part_path(target: &Path, part: usize) -> PathBuf {
    if part <= 1 {
        return target.to_path_buf();
    }
    let stem = target
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match target.extension() {
        Some(ext) => format!("{stem}_part{part}.{}", ext.to_string_lossy()),
        None => format!("{stem}_part{part}"),
    };
    target.with_file_name(name)
}

/// Serialize a frame to CSV text.
pub fn render_csv(df: &mut DataFrame, separator: u8) -> PolarsResult<String> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_separator(separator)
        .finish(df)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write `df` to a single file.
pub fn write_csv(df: &mut DataFrame, path: &Path, separator: u8) -> Result<()> {
    let file = File::create(path).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    CsvWriter::new(&mut writer)
        .include_header(true)
        .with_separator(separator)
        .finish(df)
        .map_err(|source| OutputError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

/// Remove parts left over from an earlier, larger run.
fn remove_stale_parts(target: &Path, first_stale: usize) -> Result<()> {
    let mut part = first_stale.max(2);
    loop {
        let path = part_path(target, part);
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(&path).map_err(|source| OutputError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "removed stale part");
        part += 1;
    }
}

/// Write `df` to `target`, split into parts of at most `chunk_size` rows.
///
/// An empty frame still produces a header-only file. Returns the written
/// paths in part order.
pub fn write_chunked(df: &DataFrame, target: &Path, options: CsvOptions) -> Result<Vec<PathBuf>> {
    if options.chunk_size == 0 {
        return Err(OutputError::InvalidChunkSize);
    }
    let parts = df.height().div_ceil(options.chunk_size).max(1);
    let mut written = Vec::with_capacity(parts);
    for part in 0..parts {
        let path = part_path(target, part + 1);
        let offset = (part * options.chunk_size) as i64;
        let mut chunk = df.slice(offset, options.chunk_size);
        write_csv(&mut chunk, &path, options.separator)?;
        debug!(path = %path.display(), rows = chunk.height(), "wrote part");
        written.push(path);
    }
    remove_stale_parts(target, parts + 1)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_names() {
        let target = Path::new("/tmp/out/CARGA_CONSULTAS_GES.csv");
        assert_eq!(part_path(target, 1), target);
        assert_eq!(
            part_path(target, 3),
            Path::new("/tmp/out/CARGA_CONSULTAS_GES_part3.csv")
        );
        assert_eq!(
            part_path(Path::new("cruce"), 2),
            Path::new("cruce_part2")
        );
    }
}
