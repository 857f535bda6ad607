//! Coverage of each population member across the visit and medication feeds.
//!
//! Counts use every row whose identifier normalizes, before any state,
//! specialty or date filter, so the report shows what the source systems
//! recorded rather than what was billed.

use ges_model::{CrossReportRow, MedicationRow, VisitRow};

use crate::classifier::clean_location;
use crate::population::PopulationIndex;

#[derive(Debug, Default)]
struct Tally {
    visits: usize,
    specialties: Vec<String>,
    medications: usize,
    locations: Vec<String>,
}

fn push_distinct(values: &mut Vec<String>, value: String) {
    if !value.is_empty() && !values.contains(&value) {
        values.push(value);
    }
}

pub fn build_cross_report(
    index: &PopulationIndex,
    visits: &[VisitRow],
    medications: &[MedicationRow],
) -> Vec<CrossReportRow> {
    let mut tallies: Vec<Tally> = index.members().iter().map(|_| Tally::default()).collect();

    for visit in visits {
        let Some(position) = visit
            .id
            .identifier()
            .and_then(|identifier| index.member_position(&identifier))
        else {
            continue;
        };
        let tally = &mut tallies[position];
        tally.visits += 1;
        push_distinct(&mut tally.specialties, visit.specialty_code.trim().to_string());
    }
    for medication in medications {
        let Some(position) = medication
            .id
            .identifier()
            .and_then(|identifier| index.member_position(&identifier))
        else {
            continue;
        };
        let tally = &mut tallies[position];
        tally.medications += 1;
        push_distinct(&mut tally.locations, clean_location(&medication.location));
    }

    index
        .members()
        .iter()
        .zip(tallies)
        .map(|(member, tally)| CrossReportRow {
            body: member.body.to_string(),
            check: member.check.map(String::from).unwrap_or_default(),
            condition: member.condition.label().to_string(),
            visit_count: tally.visits,
            visit_specialties: tally.specialties,
            medication_count: tally.medications,
            medication_locations: tally.locations,
        })
        .collect()
}
