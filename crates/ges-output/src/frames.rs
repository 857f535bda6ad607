//! DataFrame construction for every output table.
//!
//! All columns are text; dates and codes are already formatted by the time
//! records reach this module.

use ges_model::{
    Coverage, CrossReportRow, MissingDateRecord, OutputRecord, REVIEW_ACTION, REVIEW_REASON,
    ReviewRecord,
};
use polars::prelude::{Column, DataFrame};

use crate::error::{OutputError, Result};

pub const LOAD_FILE_COLUMNS: [&str; 7] = [
    "FECHA",
    "RUT",
    "DV",
    "PRESTACION",
    "TIPO",
    "PS-FAM",
    "ESPECIALIDAD",
];

pub const REVIEW_COLUMNS: [&str; 6] = [
    "RUT",
    "FARMACO",
    "TIPO_MEDICAMENTO",
    "FECHA_DESPACHO",
    "MOTIVO",
    "ACCION_REQUERIDA",
];

pub const MISSING_DATE_COLUMNS: [&str; 6] = [
    "RUT",
    "FARMACO",
    "CANTIDAD",
    "LOCAL_SOLICITANTE",
    "FECHA",
    "ORIGEN",
];

pub const CROSS_REPORT_COLUMNS: [&str; 13] = [
    "RUT",
    "DV",
    "PATOLOGIA_GES",
    "TUVO_CONSULTA",
    "NUM_CONSULTAS",
    "ESPECIALIDADES_CONSULTA",
    "TUVO_MEDICAMENTO",
    "NUM_MEDICAMENTOS",
    "ESPECIALIDADES_PRESCRIPCION",
    "ATENCION_COMPLETA",
    "SOLO_CONSULTA",
    "SOLO_MEDICAMENTO",
    "SIN_ATENCION",
];

fn frame_from_rows<const N: usize>(
    table: &'static str,
    headers: [&str; N],
    rows: impl Iterator<Item = [String; N]>,
) -> Result<DataFrame> {
    let mut values: Vec<Vec<String>> = vec![Vec::new(); N];
    for row in rows {
        for (column, cell) in values.iter_mut().zip(row) {
            column.push(cell);
        }
    }
    let columns: Vec<Column> = headers
        .iter()
        .zip(values)
        .map(|(name, cells)| Column::new((*name).into(), cells))
        .collect();
    DataFrame::new(columns).map_err(|source| OutputError::Frame { table, source })
}

fn yes_no(value: bool) -> String {
    if value { "SÍ" } else { "NO" }.to_string()
}

/// Visit or medication load file.
pub fn load_file_frame(records: &[OutputRecord]) -> Result<DataFrame> {
    frame_from_rows(
        "load file",
        LOAD_FILE_COLUMNS,
        records.iter().map(OutputRecord::cells),
    )
}

pub fn review_frame(records: &[ReviewRecord]) -> Result<DataFrame> {
    frame_from_rows(
        "review",
        REVIEW_COLUMNS,
        records.iter().map(|record| {
            [
                record.identifier.canonical_string(),
                record.drug.clone(),
                record.category.as_str().to_string(),
                record.dispensed_on.clone(),
                REVIEW_REASON.to_string(),
                REVIEW_ACTION.to_string(),
            ]
        }),
    )
}

pub fn missing_date_frame(records: &[MissingDateRecord]) -> Result<DataFrame> {
    frame_from_rows(
        "missing date",
        MISSING_DATE_COLUMNS,
        records.iter().map(|record| {
            [
                record.identifier.canonical_string(),
                record.drug.clone(),
                record.quantity.clone(),
                record.location.clone(),
                record.date_text.clone(),
                record.origin.as_str().to_string(),
            ]
        }),
    )
}

pub fn cross_report_frame(rows: &[CrossReportRow]) -> Result<DataFrame> {
    frame_from_rows(
        "cross report",
        CROSS_REPORT_COLUMNS,
        rows.iter().map(|row| {
            let coverage = row.coverage();
            [
                row.body.clone(),
                row.check.clone(),
                row.condition.clone(),
                yes_no(row.had_visit()),
                row.visit_count.to_string(),
                row.visit_specialties.join("; "),
                yes_no(row.had_medication()),
                row.medication_count.to_string(),
                row.medication_locations.join("; "),
                yes_no(coverage == Coverage::Complete),
                yes_no(coverage == Coverage::VisitOnly),
                yes_no(coverage == Coverage::MedicationOnly),
                yes_no(coverage == Coverage::Missing),
            ]
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tables_keep_their_headers() {
        let frame = load_file_frame(&[]).expect("frame");
        assert_eq!(frame.height(), 0);
        let names: Vec<&str> = frame
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect();
        assert_eq!(names, LOAD_FILE_COLUMNS);
    }
}
