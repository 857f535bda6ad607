//! Run-level orchestration: classify every row, deduplicate per identifier,
//! and assemble the output tables with run statistics.

use std::collections::BTreeMap;

use ges_model::{
    ClassificationRow, CrossReportRow, MedicationOrigin, MedicationRow, MissingDateRecord,
    ModelError, OutputRecord, PopulationRow, ReviewRecord, VisitRow,
};
use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::classifier::{Classified, Classifier};
use crate::crossref::build_cross_report;
use crate::dedupe::dedupe_by_identifier;
use crate::population::{IndexOptions, PopulationIndex, PopulationReport};
use crate::rules::Rules;
use crate::skip::SkipReason;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    pub lenient_conditions: bool,
    /// Build the per-member coverage report.
    pub cross_report: bool,
}

/// The five input tables of one run.
///
/// `None` marks a table that was not supplied; its load file is then not
/// produced at all, as opposed to an empty one.
#[derive(Debug, Clone, Default)]
pub struct ReconcileInput {
    pub population: Vec<PopulationRow>,
    pub progression: Option<Vec<ClassificationRow>>,
    pub severity: Option<Vec<ClassificationRow>>,
    pub visits: Option<Vec<VisitRow>>,
    /// Dispensations and prescriptions, unioned.
    pub medications: Option<Vec<MedicationRow>>,
    pub options: ReconcileOptions,
}

/// Counters for one encounter stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    pub rows_read: usize,
    pub classified: usize,
    pub routed_to_review: usize,
    pub missing_date: usize,
    pub duplicates_removed: usize,
    pub emitted: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl StreamStats {
    fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_default() += 1;
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub population: PopulationReport,
    pub visits: StreamStats,
    pub medications: StreamStats,
    /// Medication rows read per origin (`farmacia`, `recetas`).
    pub medications_by_origin: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileOutput {
    /// `None` when the visit table was not supplied.
    pub visits: Option<Vec<OutputRecord>>,
    /// `None` when neither medication table was supplied.
    pub medications: Option<Vec<OutputRecord>>,
    pub review: Vec<ReviewRecord>,
    pub missing_dates: Vec<MissingDateRecord>,
    pub cross_report: Option<Vec<CrossReportRow>>,
    pub stats: RunStats,
}

impl ReconcileOutput {
    /// Visit load-file rows; empty when the table was not supplied.
    pub fn visit_records(&self) -> &[OutputRecord] {
        self.visits.as_deref().unwrap_or_default()
    }

    /// Medication load-file rows; empty when no table was supplied.
    pub fn medication_records(&self) -> &[OutputRecord] {
        self.medications.as_deref().unwrap_or_default()
    }
}

#[derive(Default)]
struct Sinks {
    output: Vec<OutputRecord>,
    review: Vec<ReviewRecord>,
    missing_dates: Vec<MissingDateRecord>,
}

fn classify_stream<T>(
    rows: &[T],
    classify: impl Fn(&T) -> Result<Classified, SkipReason>,
    stats: &mut StreamStats,
) -> Sinks {
    let mut sinks = Sinks::default();
    stats.rows_read = rows.len();
    for row in rows {
        match classify(row) {
            Ok(Classified::Output(record)) => {
                stats.classified += 1;
                sinks.output.push(record);
            }
            Ok(Classified::Review(record)) => {
                stats.routed_to_review += 1;
                sinks.review.push(record);
            }
            Ok(Classified::MissingDate(record)) => {
                stats.missing_date += 1;
                sinks.missing_dates.push(record);
            }
            Err(reason) => stats.skip(reason),
        }
    }
    sinks
}

/// Deduplicate, then drop anything still lacking a parsed date.
fn finish(records: Vec<OutputRecord>, stats: &mut StreamStats) -> Vec<OutputRecord> {
    let before = records.len();
    let deduped = dedupe_by_identifier(records);
    stats.duplicates_removed = before - deduped.len();
    let (kept, blank): (Vec<_>, Vec<_>) = deduped
        .into_iter()
        .partition(|record| record.date.is_some());
    if !blank.is_empty() {
        *stats.skipped.entry(SkipReason::BlankDate).or_default() += blank.len();
    }
    stats.emitted = kept.len();
    kept
}

/// Classify, deduplicate and assemble one run.
///
/// Fails only when the population registry cannot be indexed (an
/// unrecognized condition label without lenient mode).
pub fn reconcile(input: &ReconcileInput, rules: &Rules) -> Result<ReconcileOutput, ModelError> {
    let _span = info_span!("reconcile").entered();
    let index = PopulationIndex::build(
        &input.population,
        input.progression.as_deref(),
        input.severity.as_deref(),
        IndexOptions {
            lenient_conditions: input.options.lenient_conditions,
        },
    )?;
    let mut output = reconcile_with_index(&index, input, rules);
    if input.options.cross_report {
        output.cross_report = Some(build_cross_report(
            &index,
            input.visits.as_deref().unwrap_or_default(),
            input.medications.as_deref().unwrap_or_default(),
        ));
    }
    Ok(output)
}

/// Same as [`reconcile`] with a prebuilt index; never builds the cross report.
pub fn reconcile_with_index(
    index: &PopulationIndex,
    input: &ReconcileInput,
    rules: &Rules,
) -> ReconcileOutput {
    let classifier = Classifier::new(index, rules);
    let mut stats = RunStats {
        population: index.report().clone(),
        ..RunStats::default()
    };

    let visits = match &input.visits {
        Some(rows) => {
            let _span = info_span!("classify_visits", rows = rows.len()).entered();
            let sinks = classify_stream(
                rows,
                |row| classifier.classify_visit(row),
                &mut stats.visits,
            );
            Some(finish(sinks.output, &mut stats.visits))
        }
        None => {
            info!("visit table not supplied, no visit load file");
            None
        }
    };

    let mut review = Vec::new();
    let mut missing_dates = Vec::new();
    let medications = match &input.medications {
        Some(rows) => {
            let _span = info_span!("classify_medications", rows = rows.len()).entered();
            for origin in [MedicationOrigin::Dispensation, MedicationOrigin::Prescription] {
                let count = rows.iter().filter(|row| row.origin == origin).count();
                stats
                    .medications_by_origin
                    .insert(origin.as_str().to_string(), count);
            }
            let sinks = classify_stream(
                rows,
                |row| classifier.classify_medication(row),
                &mut stats.medications,
            );
            review = sinks.review;
            missing_dates = sinks.missing_dates;
            Some(finish(sinks.output, &mut stats.medications))
        }
        None => {
            info!("medication tables not supplied, no medication load file");
            None
        }
    };

    debug!(skipped = ?stats.visits.skipped, "visit skip reasons");
    debug!(skipped = ?stats.medications.skipped, "medication skip reasons");
    info!(
        visits = visits.as_ref().map_or(0, Vec::len),
        medications = medications.as_ref().map_or(0, Vec::len),
        review = review.len(),
        missing_dates = missing_dates.len(),
        "reconciliation complete"
    );

    ReconcileOutput {
        visits,
        medications,
        review,
        missing_dates,
        cross_report: None,
        stats,
    }
}
