//! Typed loaders for the five input feeds.
//!
//! Each loader resolves its columns through the alias lists in
//! [`crate::columns`] and returns raw rows with every cell kept as text.
//! The `*_from_table` variants work on an already parsed [`CsvTable`].

use std::path::Path;

use ges_model::{
    ClassificationRow, MedicationOrigin, MedicationRow, PopulationRow, RawIdentifier, VisitRow,
};
use tracing::{debug, info};

use crate::columns::{self, ColumnResolver, ColumnSpec};
use crate::csv_table::{CsvTable, IngestOptions, read_csv_table_with_options};
use crate::error::Result;

fn load<T>(
    path: &Path,
    options: IngestOptions,
    parse: impl FnOnce(&CsvTable) -> Result<Vec<T>>,
    table_name: &str,
) -> Result<Vec<T>> {
    let table = read_csv_table_with_options(path, options)?;
    debug!(
        table = table_name,
        path = %path.display(),
        columns = table.headers.len(),
        "read input table"
    );
    let rows = parse(&table)?;
    info!(table = table_name, rows = rows.len(), "loaded input table");
    Ok(rows)
}

fn cell_or_empty(table: &CsvTable, row: usize, col: Option<usize>) -> String {
    col.map(|col| table.cell(row, col).to_string())
        .unwrap_or_default()
}

pub fn load_population(path: &Path, options: IngestOptions) -> Result<Vec<PopulationRow>> {
    load(path, options, population_from_table, "poblacion")
}

pub fn population_from_table(table: &CsvTable) -> Result<Vec<PopulationRow>> {
    let resolver = ColumnResolver::new("poblacion", table);
    let id_col = resolver.required(columns::population::ID)?;
    let check_col = resolver.optional(columns::population::CHECK);
    let condition_col = resolver.required(columns::population::CONDITION)?;
    Ok((0..table.rows.len())
        .map(|row| PopulationRow {
            id: RawIdentifier::split(
                table.cell(row, id_col),
                cell_or_empty(table, row, check_col),
            ),
            condition: table.cell(row, condition_col).to_string(),
        })
        .collect())
}

pub fn load_progression(path: &Path, options: IngestOptions) -> Result<Vec<ClassificationRow>> {
    load(path, options, progression_from_table, "progresion")
}

pub fn progression_from_table(table: &CsvTable) -> Result<Vec<ClassificationRow>> {
    classification_from_table(
        "progresion",
        table,
        columns::progression::ID,
        columns::progression::VALUE,
    )
}

pub fn load_severity(path: &Path, options: IngestOptions) -> Result<Vec<ClassificationRow>> {
    load(path, options, severity_from_table, "severidad")
}

pub fn severity_from_table(table: &CsvTable) -> Result<Vec<ClassificationRow>> {
    classification_from_table(
        "severidad",
        table,
        columns::severity::ID,
        columns::severity::VALUE,
    )
}

fn classification_from_table(
    table_name: &str,
    table: &CsvTable,
    id: ColumnSpec,
    value: ColumnSpec,
) -> Result<Vec<ClassificationRow>> {
    let resolver = ColumnResolver::new(table_name, table);
    let id_col = resolver.required(id)?;
    let value_col = resolver.required(value)?;
    Ok((0..table.rows.len())
        .map(|row| ClassificationRow {
            id: table.cell(row, id_col).to_string(),
            value: table.cell(row, value_col).to_string(),
        })
        .collect())
}

pub fn load_visits(path: &Path, options: IngestOptions) -> Result<Vec<VisitRow>> {
    load(path, options, visits_from_table, "consultas")
}

pub fn visits_from_table(table: &CsvTable) -> Result<Vec<VisitRow>> {
    use columns::visits;

    let resolver = ColumnResolver::new("consultas", table);
    // Scheduling exports carry a combined RUN; older extracts split it.
    let id_cols = match resolver.optional(visits::COMBINED_ID) {
        Some(col) => IdColumns::Combined(col),
        None => IdColumns::Split {
            body: resolver.required(visits::BODY)?,
            check: resolver.required(visits::CHECK)?,
        },
    };
    let date_col = resolver.required(visits::DATE)?;
    let specialty_col = resolver.required(visits::SPECIALTY_CODE)?;
    let desc_col = resolver.optional(visits::SPECIALTY_DESC);
    let state_col = resolver.required(visits::STATE)?;
    Ok((0..table.rows.len())
        .map(|row| VisitRow {
            id: id_cols.read(table, row),
            date: table.cell(row, date_col).to_string(),
            specialty_code: table.cell(row, specialty_col).to_string(),
            specialty_desc: cell_or_empty(table, row, desc_col),
            state: table.cell(row, state_col).to_string(),
        })
        .collect())
}

#[derive(Debug, Clone, Copy)]
enum IdColumns {
    Combined(usize),
    Split { body: usize, check: usize },
}

impl IdColumns {
    fn read(self, table: &CsvTable, row: usize) -> RawIdentifier {
        match self {
            IdColumns::Combined(col) => RawIdentifier::combined(table.cell(row, col)),
            IdColumns::Split { body, check } => {
                RawIdentifier::split(table.cell(row, body), table.cell(row, check))
            }
        }
    }
}

pub fn load_dispensations(path: &Path, options: IngestOptions) -> Result<Vec<MedicationRow>> {
    load(path, options, dispensations_from_table, "farmacia")
}

pub fn dispensations_from_table(table: &CsvTable) -> Result<Vec<MedicationRow>> {
    use columns::dispensations as cols;

    medications_from_table(
        "farmacia",
        table,
        MedicationColumns {
            body: cols::BODY,
            check: cols::CHECK,
            date: cols::DATE,
            drug: cols::DRUG,
            quantity: cols::QUANTITY,
            location: cols::LOCATION,
        },
        MedicationOrigin::Dispensation,
    )
}

pub fn load_prescriptions(path: &Path, options: IngestOptions) -> Result<Vec<MedicationRow>> {
    load(path, options, prescriptions_from_table, "recetas")
}

pub fn prescriptions_from_table(table: &CsvTable) -> Result<Vec<MedicationRow>> {
    use columns::prescriptions as cols;

    medications_from_table(
        "recetas",
        table,
        MedicationColumns {
            body: cols::BODY,
            check: cols::CHECK,
            date: cols::DATE,
            drug: cols::DRUG,
            quantity: cols::QUANTITY,
            location: cols::LOCATION,
        },
        MedicationOrigin::Prescription,
    )
}

struct MedicationColumns {
    body: ColumnSpec,
    check: ColumnSpec,
    date: ColumnSpec,
    drug: ColumnSpec,
    quantity: ColumnSpec,
    location: ColumnSpec,
}

fn medications_from_table(
    table_name: &str,
    table: &CsvTable,
    specs: MedicationColumns,
    origin: MedicationOrigin,
) -> Result<Vec<MedicationRow>> {
    let resolver = ColumnResolver::new(table_name, table);
    let body_col = resolver.required(specs.body)?;
    let check_col = resolver.required(specs.check)?;
    let date_col = resolver.required(specs.date)?;
    let drug_col = resolver.required(specs.drug)?;
    let quantity_col = resolver.optional(specs.quantity);
    let location_col = resolver.optional(specs.location);
    Ok((0..table.rows.len())
        .map(|row| MedicationRow {
            id: RawIdentifier::split(table.cell(row, body_col), table.cell(row, check_col)),
            date: table.cell(row, date_col).to_string(),
            drug: table.cell(row, drug_col).to_string(),
            quantity: cell_or_empty(table, row, quantity_col),
            location: cell_or_empty(table, row, location_col),
            origin,
        })
        .collect())
}
