use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use ges_core::{ReconcileInput, ReconcileOptions, Rules, reconcile};
use ges_ingest::{
    IngestOptions, load_dispensations, load_population, load_prescriptions, load_progression,
    load_severity, load_visits,
};
use ges_model::{Condition, SeverityTier};
use ges_output::{CsvOptions, OutputOptions, write_outputs};
use tracing::{debug, info, info_span};

use crate::cli::{RulesArgs, RunArgs};
use crate::summary::apply_table_style;
use crate::types::{InputFile, RunResult, TableCounts};

type Loader<T> = fn(&Path, IngestOptions) -> ges_ingest::Result<Vec<T>>;

pub fn run_reconcile(args: &RunArgs) -> Result<RunResult> {
    let run_span = info_span!("run", output_dir = %args.output_dir.display());
    let _run_guard = run_span.enter();
    let started = Instant::now();
    let rules = load_rules(args.rules.as_deref())?;
    let ingest = IngestOptions {
        delimiter: args.delimiter,
    };

    // =========================================================================
    // Stage 1: Ingest
    // =========================================================================
    let mut inputs = Vec::new();
    let population = load_population(&args.population, ingest)
        .with_context(|| format!("load population {}", args.population.display()))?;
    inputs.push(InputFile::new(
        "population",
        &args.population,
        population.len(),
    ));
    let progression = load_optional(
        "progression",
        args.progression.as_deref(),
        ingest,
        load_progression,
        &mut inputs,
    )?;
    let severity = load_optional(
        "severity",
        args.severity.as_deref(),
        ingest,
        load_severity,
        &mut inputs,
    )?;
    let visits = load_optional(
        "visits",
        args.visits.as_deref(),
        ingest,
        load_visits,
        &mut inputs,
    )?;
    let dispensations = load_optional(
        "dispensations",
        args.dispensations.as_deref(),
        ingest,
        load_dispensations,
        &mut inputs,
    )?;
    let prescriptions = load_optional(
        "prescriptions",
        args.prescriptions.as_deref(),
        ingest,
        load_prescriptions,
        &mut inputs,
    )?;
    let medications = match (dispensations, prescriptions) {
        (None, None) => None,
        (dispensations, prescriptions) => Some(
            dispensations
                .into_iter()
                .chain(prescriptions)
                .flatten()
                .collect(),
        ),
    };

    // =========================================================================
    // Stage 2: Classify and deduplicate
    // =========================================================================
    let input = ReconcileInput {
        population,
        progression,
        severity,
        visits,
        medications,
        options: ReconcileOptions {
            lenient_conditions: args.lenient_conditions,
            cross_report: !args.no_cross_report,
        },
    };
    let output = reconcile(&input, &rules).context("index eligible population")?;

    // =========================================================================
    // Stage 3: Write
    // =========================================================================
    let files = if args.dry_run {
        info!("dry run, no files written");
        Vec::new()
    } else {
        let options = OutputOptions {
            csv: CsvOptions {
                chunk_size: args.chunk_size,
                ..CsvOptions::default()
            },
            stamp: args.stamp.then(run_stamp),
        };
        let written = write_outputs(&output, &args.output_dir, &options)
            .with_context(|| format!("write outputs to {}", args.output_dir.display()))?;
        written.all().cloned().collect()
    };

    let result = RunResult {
        output_dir: args.output_dir.clone(),
        dry_run: args.dry_run,
        inputs,
        tables: TableCounts::of(&output),
        stats: output.stats,
        files,
    };
    if let Some(path) = &args.summary_json {
        write_summary_json(&result, path)?;
    }
    info!(
        elapsed_ms = started.elapsed().as_millis(),
        files = result.files.len(),
        "run complete"
    );
    Ok(result)
}

fn load_optional<T>(
    table: &'static str,
    path: Option<&Path>,
    options: IngestOptions,
    load: Loader<T>,
    inputs: &mut Vec<InputFile>,
) -> Result<Option<Vec<T>>> {
    let Some(path) = path else {
        debug!(table, "table not supplied");
        return Ok(None);
    };
    let rows = load(path, options).with_context(|| format!("load {table} {}", path.display()))?;
    inputs.push(InputFile::new(table, path, rows.len()));
    Ok(Some(rows))
}

fn load_rules(path: Option<&Path>) -> Result<Rules> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading rules override");
            Rules::from_path(path).with_context(|| format!("load rules {}", path.display()))
        }
        None => Rules::embedded().context("load embedded rules"),
    }
}

fn run_stamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn write_summary_json(result: &RunResult, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("serialize run summary")?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(path, json).with_context(|| format!("write summary {}", path.display()))?;
    info!(path = %path.display(), "summary written");
    Ok(())
}

pub fn run_rules(args: &RulesArgs) -> Result<()> {
    let rules = load_rules(args.rules.as_deref())?;

    let mut codes = Table::new();
    codes.set_header(vec!["Group", "Family", "Keywords", "Code"]);
    apply_table_style(&mut codes);
    let asthma = &rules.medications.asthma;
    for family in &asthma.families {
        codes.add_row(vec![
            "ASMA".to_string(),
            family.name.clone(),
            family.keywords.join(", "),
            family.code.as_str().to_string(),
        ]);
    }
    codes.add_row(vec![
        "ASMA".to_string(),
        "default".to_string(),
        "-".to_string(),
        asthma.default_code.as_str().to_string(),
    ]);
    let fibrosis = &rules.medications.fibrosis;
    for family in &fibrosis.families {
        codes.add_row(vec![
            "Fibrosis".to_string(),
            family.name.clone(),
            family.keywords.join(", "),
            family.code.as_str().to_string(),
        ]);
    }
    for tier in [SeverityTier::Mild, SeverityTier::Moderate, SeverityTier::Severe] {
        codes.add_row(vec![
            "Fibrosis".to_string(),
            format!("severidad {}", tier.as_str()),
            "-".to_string(),
            fibrosis.severity_codes.code(tier).as_str().to_string(),
        ]);
    }
    for family in &rules.review.families {
        codes.add_row(vec![
            "Revisión".to_string(),
            family.category.as_str().to_string(),
            family.keywords.join(", "),
            "-".to_string(),
        ]);
    }
    println!("{codes}");

    let mut visits = Table::new();
    visits.set_header(vec!["Condition", "Specialties"]);
    apply_table_style(&mut visits);
    for condition in Condition::KNOWN {
        visits.add_row(vec![
            condition.label().to_string(),
            rules.visits.specialties.for_condition(condition).join(", "),
        ]);
    }
    println!("{visits}");
    println!("Valid visit states: {}", rules.visits.valid_states.join(", "));
    Ok(())
}
