use std::path::PathBuf;

use polars::prelude::PolarsError;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build table {table}: {source}")]
    Frame {
        table: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("failed to serialize {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("chunk size must be at least 1")]
    InvalidChunkSize,
}

pub type Result<T> = std::result::Result<T, OutputError>;
