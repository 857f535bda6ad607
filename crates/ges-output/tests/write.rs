use std::fs;

use chrono::NaiveDate;
use ges_core::ReconcileOutput;
use ges_model::{
    Condition, Identifier, MedicationOrigin, MissingDateRecord, OutputRecord, ProcedureCode,
    ReviewCategory, ReviewRecord,
};
use ges_output::{
    CsvOptions, MEDICATIONS_FILE, MISSING_DATE_FILE, OutputOptions, REVIEW_FILE, VISITS_FILE,
    load_file_frame, part_path, render_csv, write_chunked, write_outputs,
};
use tempfile::TempDir;

fn record(body: u64, day: u32) -> OutputRecord {
    let date = NaiveDate::from_ymd_opt(2025, 1, day);
    OutputRecord {
        date,
        date_text: date
            .map(|d| d.format("%d-%m-%Y").to_string())
            .unwrap_or_default(),
        identifier: Identifier::normalize(&body.to_string(), "k").expect("identifier"),
        code: ProcedureCode::new("101113").expect("code"),
        condition: Condition::Asthma,
        family_code: Condition::Asthma.family_code().to_string(),
        specialty: "07-102-0".to_string(),
    }
}

fn line_count(path: &std::path::Path) -> usize {
    fs::read_to_string(path).expect("read").lines().count()
}

#[test]
fn load_file_layout() {
    let mut frame = load_file_frame(&[record(11_111_111, 15)]).expect("frame");
    let text = render_csv(&mut frame, b',').expect("render");
    insta::assert_snapshot!(text, @r"
    FECHA,RUT,DV,PRESTACION,TIPO,PS-FAM,ESPECIALIDAD
    15-01-2025,11111111,K,0101113,AUGE,61,07-102-0
    ");
}

#[test]
fn splits_into_parts_and_clears_stale_ones() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join(VISITS_FILE);
    let records: Vec<OutputRecord> = (0..1200).map(|i| record(10_000_000 + i, 1)).collect();
    let frame = load_file_frame(&records).expect("frame");

    let written = write_chunked(&frame, &target, CsvOptions::default()).expect("write");
    assert_eq!(written.len(), 3);
    assert_eq!(written[0], target);
    assert!(written[2].ends_with("CARGA_CONSULTAS_GES_part3.csv"));
    assert_eq!(line_count(&written[0]), 500);
    assert_eq!(line_count(&written[1]), 500);
    assert_eq!(line_count(&written[2]), 203);
    let first_row = fs::read_to_string(&written[1]).expect("read");
    assert!(first_row.lines().nth(1).expect("row").contains("10000499"));

    let small = load_file_frame(&records[..10]).expect("frame");
    let rewritten = write_chunked(&small, &target, CsvOptions::default()).expect("rewrite");
    assert_eq!(rewritten, vec![target.clone()]);
    assert!(!written[1].exists());
    assert!(!written[2].exists());
}

#[test]
fn zero_chunk_size_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let frame = load_file_frame(&[]).expect("frame");
    let options = CsvOptions {
        chunk_size: 0,
        ..CsvOptions::default()
    };
    assert!(write_chunked(&frame, &dir.path().join("x.csv"), options).is_err());
}

#[test]
fn writes_every_table_of_a_run() {
    let dir = TempDir::new().expect("tempdir");
    let identifier: Identifier = "99999999-9".parse().expect("identifier");
    let output = ReconcileOutput {
        visits: Some(vec![record(11_111_111, 2)]),
        medications: Some(Vec::new()),
        review: vec![ReviewRecord {
            identifier,
            drug: "MORFINA".to_string(),
            category: ReviewCategory::Palliative,
            dispensed_on: "01-02-2025".to_string(),
        }],
        missing_dates: vec![MissingDateRecord {
            identifier,
            drug: "TIOTROPIO".to_string(),
            quantity: "1".to_string(),
            location: "INT-07-102-0".to_string(),
            date_text: String::new(),
            origin: MedicationOrigin::Prescription,
        }],
        ..ReconcileOutput::default()
    };

    let written = write_outputs(&output, dir.path(), &OutputOptions::default()).expect("write");
    assert_eq!(written.visits, vec![dir.path().join(VISITS_FILE)]);
    assert_eq!(line_count(&dir.path().join(MEDICATIONS_FILE)), 1);
    assert!(written.cross_report.is_none());

    let review = fs::read_to_string(dir.path().join(REVIEW_FILE)).expect("review");
    assert!(review.starts_with("RUT,FARMACO,TIPO_MEDICAMENTO,FECHA_DESPACHO"));
    assert!(review.contains("99999999-9,MORFINA,PALIATIVO,01-02-2025"));

    let missing = fs::read_to_string(dir.path().join(MISSING_DATE_FILE)).expect("missing");
    let row = missing.lines().nth(1).expect("row");
    assert!(row.starts_with("99999999-9,TIOTROPIO,1,INT-07-102-0,"));
    assert!(row.ends_with(",recetas"));
    assert_eq!(written.all().count(), 4);
}

#[test]
fn reruns_are_byte_identical() {
    let dir = TempDir::new().expect("tempdir");
    let output = ReconcileOutput {
        visits: Some(
            (1..20)
                .map(|day| record(20_000_000 + u64::from(day), day))
                .collect(),
        ),
        ..ReconcileOutput::default()
    };
    write_outputs(&output, dir.path(), &OutputOptions::default()).expect("first");
    let first = fs::read(dir.path().join(VISITS_FILE)).expect("read");
    write_outputs(&output, dir.path(), &OutputOptions::default()).expect("second");
    let second = fs::read(dir.path().join(VISITS_FILE)).expect("read");
    assert_eq!(first, second);
}

#[test]
fn side_tables_are_split_like_load_files() {
    let dir = TempDir::new().expect("tempdir");
    let identifier: Identifier = "11111111-1".parse().expect("identifier");
    let output = ReconcileOutput {
        missing_dates: (0..1200)
            .map(|i| MissingDateRecord {
                identifier,
                drug: format!("TIOTROPIO {i}"),
                quantity: "1".to_string(),
                location: "INT-07-102-0".to_string(),
                date_text: String::new(),
                origin: MedicationOrigin::Dispensation,
            })
            .collect(),
        ..ReconcileOutput::default()
    };

    let written = write_outputs(&output, dir.path(), &OutputOptions::default()).expect("write");
    let target = dir.path().join(MISSING_DATE_FILE);
    assert_eq!(
        written.missing_dates,
        vec![target.clone(), part_path(&target, 2), part_path(&target, 3)]
    );
    assert_eq!(line_count(&written.missing_dates[0]), 500);
    assert_eq!(line_count(&written.missing_dates[2]), 203);
}

#[test]
fn absent_inputs_leave_previous_load_files_alone() {
    let dir = TempDir::new().expect("tempdir");
    let previous = dir.path().join(VISITS_FILE);
    fs::write(&previous, "previous run\n").expect("seed");

    let written =
        write_outputs(&ReconcileOutput::default(), dir.path(), &OutputOptions::default())
            .expect("write");
    assert_eq!(written.all().count(), 0);
    assert_eq!(fs::read_to_string(&previous).expect("read"), "previous run\n");
    assert!(!dir.path().join(MEDICATIONS_FILE).exists());
}
