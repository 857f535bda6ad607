//! Input ingestion for GES reconciliation runs.

pub mod columns;
pub mod csv_table;
pub mod error;
pub mod loaders;

pub use csv_table::{
    CsvTable, IngestOptions, parse_csv_table, read_csv_table, read_csv_table_with_options,
    sniff_delimiter,
};
pub use error::{IngestError, Result};
pub use loaders::{
    dispensations_from_table, load_dispensations, load_population, load_prescriptions,
    load_progression, load_severity, load_visits, population_from_table,
    prescriptions_from_table, progression_from_table, severity_from_table, visits_from_table,
};
