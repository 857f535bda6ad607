//! End-to-end runs of the `run` command over fixture files.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use ges_cli::cli::{Cli, Command, RunArgs};
use ges_cli::commands::run_reconcile;
use ges_output::{CROSS_REPORT_FILE, MEDICATIONS_FILE, REVIEW_FILE, VISITS_FILE};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn fixtures(dir: &Path) -> Vec<String> {
    let population = write(
        dir,
        "poblacion.csv",
        "RUT;DV;Ges\n11111111;1;EPOC\n22222222;2;ASMA\n",
    );
    let visits = write(
        dir,
        "consultas.csv",
        "RUNPaciente;FechaCita;EspecialidadLocal;EspecialidadLocal_Desc;EstadoCita_Desc\n\
         11111111-1;01-01-2025;07-102-0;BRONCOPULMONAR;Atendido\n\
         11111111-1;20-01-2025;07-102-0;BRONCOPULMONAR;Atendido\n\
         22222222-2;05-01-2025;07-102-2;BRONCOPULMONAR;No Atendido\n",
    );
    let dispensations = write(
        dir,
        "farmacia.csv",
        "RutPaciente;DVPaciente;FechaDespacho;Farmaco_Desc;CantidadDespachada;LocalSolicitante\n\
         22222222;2;2025-02-03;SALBUTAMOL 100MCG;1;INT-07-102-2\n\
         99999999;9;2025-02-04;MORFINA 10MG;3;INT-07-116-0\n",
    );
    let prescriptions = write(
        dir,
        "recetas.csv",
        "FECHA EMISION;RUT PACIENTE;DIGITO;NOMBRE MEDICAMENTO;CANT.;POLICLINICO\n\
         ;11111111;1;TIOTROPIO;1;INT-07-102-0\n",
    );
    vec![
        "--population".to_string(),
        population.display().to_string(),
        "--visits".to_string(),
        visits.display().to_string(),
        "--dispensations".to_string(),
        dispensations.display().to_string(),
        "--prescriptions".to_string(),
        prescriptions.display().to_string(),
    ]
}

fn run_args(extra: &[String]) -> RunArgs {
    let argv = ["ges-reconcile", "run"]
        .into_iter()
        .map(str::to_string)
        .chain(extra.iter().cloned());
    match Cli::try_parse_from(argv).expect("parse").command {
        Command::Run(args) => args,
        Command::Rules(_) => panic!("expected run"),
    }
}

#[test]
fn run_writes_load_files_and_side_tables() {
    let dir = TempDir::new().expect("tempdir");
    let out = dir.path().join("out");
    let summary = dir.path().join("summary.json");
    let mut argv = fixtures(dir.path());
    argv.extend([
        "--output-dir".to_string(),
        out.display().to_string(),
        "--summary-json".to_string(),
        summary.display().to_string(),
    ]);

    let result = run_reconcile(&run_args(&argv)).expect("run");
    assert_eq!(result.tables.visits, Some(1));
    assert_eq!(result.tables.medications, Some(1));
    assert_eq!(result.tables.review, 1);
    assert_eq!(result.tables.missing_dates, 1);
    assert_eq!(result.tables.cross_report, Some(2));
    assert_eq!(result.inputs.len(), 4);

    let visits = fs::read_to_string(out.join(VISITS_FILE)).expect("visits");
    let lines: Vec<&str> = visits.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], "20-01-2025,11111111,1,0101110,AUGE,38,07-102-0");

    let medications = fs::read_to_string(out.join(MEDICATIONS_FILE)).expect("medications");
    assert!(medications.contains(",22222222,2,3902001,AUGE,61,07-102-2"));

    let review = fs::read_to_string(out.join(REVIEW_FILE)).expect("review");
    assert!(review.contains("99999999-9,MORFINA 10MG,PALIATIVO"));

    let cross = fs::read_to_string(out.join(CROSS_REPORT_FILE)).expect("cross report");
    assert!(cross.starts_with("RUT|DV|PATOLOGIA_GES"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary).expect("summary")).expect("json");
    assert_eq!(json["tables"]["visits"], 1);
    assert_eq!(json["stats"]["visits"]["skipped"]["invalid_state"], 1);
    assert_eq!(json["stats"]["population"]["members"], 2);
    assert_eq!(json["files"].as_array().map(Vec::len), Some(5));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let out = dir.path().join("out");
    let mut argv = fixtures(dir.path());
    argv.extend([
        "--output-dir".to_string(),
        out.display().to_string(),
        "--dry-run".to_string(),
        "--no-cross-report".to_string(),
    ]);

    let result = run_reconcile(&run_args(&argv)).expect("run");
    assert!(result.dry_run);
    assert!(result.files.is_empty());
    assert_eq!(result.tables.cross_report, None);
    assert_eq!(result.stats.visits.duplicates_removed, 1);
    assert!(!out.exists());
}

#[test]
fn unknown_condition_fails_unless_lenient() {
    let dir = TempDir::new().expect("tempdir");
    let population = write(dir.path(), "poblacion.csv", "RUT;DV;Ges\n11111111;1;Diabetes\n");
    let out = dir.path().join("out");
    let argv = vec![
        "--population".to_string(),
        population.display().to_string(),
        "--output-dir".to_string(),
        out.display().to_string(),
    ];
    assert!(run_reconcile(&run_args(&argv)).is_err());

    let mut lenient = argv.clone();
    lenient.push("--lenient-conditions".to_string());
    let result = run_reconcile(&run_args(&lenient)).expect("lenient run");
    assert_eq!(result.stats.population.unknown_labels, 1);
    assert_eq!(result.tables.visits, None);
    assert!(!out.join(VISITS_FILE).exists());
}

#[test]
fn absent_medication_inputs_keep_the_previous_load_file() {
    let dir = TempDir::new().expect("tempdir");
    let out = dir.path().join("out");
    fs::create_dir_all(&out).expect("out dir");
    fs::write(out.join(MEDICATIONS_FILE), "previous run\n").expect("seed");
    let fixture = fixtures(dir.path());
    // population and visits only
    let mut argv = fixture[..4].to_vec();
    argv.extend(["--output-dir".to_string(), out.display().to_string()]);

    let result = run_reconcile(&run_args(&argv)).expect("run");
    assert_eq!(result.tables.visits, Some(1));
    assert_eq!(result.tables.medications, None);
    assert_eq!(result.stats.medications.rows_read, 0);
    assert!(out.join(VISITS_FILE).exists());
    assert_eq!(
        fs::read_to_string(out.join(MEDICATIONS_FILE)).expect("medications"),
        "previous run\n"
    );
    assert!(!out.join(REVIEW_FILE).exists());
}

#[test]
fn missing_population_file_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    let argv = vec![
        "--population".to_string(),
        dir.path().join("nope.csv").display().to_string(),
        "--dry-run".to_string(),
    ];
    let error = run_reconcile(&run_args(&argv)).expect_err("missing file");
    assert!(format!("{error:#}").contains("load population"));
}
