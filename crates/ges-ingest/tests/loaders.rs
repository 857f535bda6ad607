use std::fs;
use std::path::PathBuf;

use ges_ingest::{
    IngestError, IngestOptions, load_dispensations, load_population, load_prescriptions,
    load_severity, load_visits,
};
use ges_model::{MedicationOrigin, RawIdentifier};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn population_with_split_identifier_columns() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(
        &dir,
        "poblacion.csv",
        b"RUT;DV;Ges\n12345678;k;EPOC\n87654321;5;Paliativos\n",
    );
    let rows = load_population(&path, IngestOptions::default()).expect("load");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, RawIdentifier::split("12345678", "k"));
    assert_eq!(rows[1].condition, "Paliativos");
}

#[test]
fn visits_with_combined_run_column() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(
        &dir,
        "consultas.csv",
        "RUNPaciente;FechaCita;EspecialidadLocal;EspecialidadLocal_Desc;EstadoCita_Desc\n\
         12345678-K;15-01-2025;07-102-0;BRONCOPULMONAR;Llegó\n"
            .as_bytes(),
    );
    let rows = load_visits(&path, IngestOptions::default()).expect("load");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, RawIdentifier::combined("12345678-K"));
    assert_eq!(rows[0].date, "15-01-2025");
    assert_eq!(rows[0].specialty_desc, "BRONCOPULMONAR");
    assert_eq!(rows[0].state, "Llegó");
}

#[test]
fn prescriptions_resolve_upper_case_spanish_headers() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(
        &dir,
        "recetas.csv",
        "FECHA EMISIÓN,RUT PACIENTE,DÍGITO,NOMBRE MEDICAMENTO,CANT.,POLICLÍNICO\n\
         2025-03-04,12345678,9,SALBUTAMOL 100MCG,2,INT-07-102-0\n"
            .as_bytes(),
    );
    let rows = load_prescriptions(&path, IngestOptions::default()).expect("load");
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.id, RawIdentifier::split("12345678", "9"));
    assert_eq!(row.date, "2025-03-04");
    assert_eq!(row.drug, "SALBUTAMOL 100MCG");
    assert_eq!(row.quantity, "2");
    assert_eq!(row.location, "INT-07-102-0");
    assert_eq!(row.origin, MedicationOrigin::Prescription);
}

#[test]
fn dispensations_tolerate_missing_optional_columns() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(
        &dir,
        "farmacia.csv",
        b"RutPaciente;DVPaciente;FechaDespacho;Farmaco_Desc\n12345678;9;;MORFINA\n",
    );
    let rows = load_dispensations(&path, IngestOptions::default()).expect("load");
    assert_eq!(rows[0].date, "");
    assert_eq!(rows[0].quantity, "");
    assert_eq!(rows[0].location, "");
    assert_eq!(rows[0].origin, MedicationOrigin::Dispensation);
}

#[test]
fn explicit_delimiter_overrides_sniffing() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "severidad.csv", b"RUT|Severidad\n12345678|Severo\n");
    let options = IngestOptions {
        delimiter: Some(b'|'),
    };
    let rows = load_severity(&path, options).expect("load");
    assert_eq!(rows[0].id, "12345678");
    assert_eq!(rows[0].value, "Severo");
}

#[test]
fn missing_required_column_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "poblacion.csv", b"RUT;Nombre\n12345678-5;Ana\n");
    let error = load_population(&path, IngestOptions::default()).expect_err("missing Ges");
    assert!(matches!(
        error,
        IngestError::MissingColumn { column: "Ges", .. }
    ));
}

#[test]
fn unreadable_file_is_an_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let error = load_visits(&dir.path().join("absent.csv"), IngestOptions::default())
        .expect_err("absent");
    assert!(matches!(error, IngestError::Io { .. }));
}
