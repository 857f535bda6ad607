//! Per-row classification of visits and medications.
//!
//! Every row yields either a [`Classified`] record or the [`SkipReason`]
//! that excluded it. A bad row never aborts the batch.

use std::sync::LazyLock;

use ges_model::{
    Condition, MedicationRow, MissingDateRecord, OutputRecord, ReviewRecord, VisitRow,
};
use regex::Regex;

use crate::datetime::format_event_date;
use crate::population::PopulationIndex;
use crate::resolver::Resolver;
use crate::rules::Rules;
use crate::skip::SkipReason;

/// Specialty written for every palliative record.
pub const PALLIATIVE_SPECIALTY: &str = "07-116-3";

/// Specialty written when the source cell is blank.
pub const DEFAULT_SPECIALTY: &str = "07-102-0";

/// A specialty code (`07-102-0`) followed by an optional service suffix:
/// `-R`, `-PS`, `A`, `A2`, ` B1`.
static LOCATION_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}-\d{3}-\d)(?:-[A-Z]+|[A-Z]\d*|\s+[A-Z]+\d*)?$")
        .expect("Invalid location code regex")
});

/// Reduce a prescribing location such as `INT-07-102-0A` to its specialty code.
///
/// Locations that do not start with a specialty code are only stripped of
/// the `INT-` prefix.
pub fn clean_location(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_prefix = trimmed.strip_prefix("INT-").unwrap_or(trimmed);
    LOCATION_CODE
        .captures(without_prefix)
        .and_then(|captures| captures.get(1))
        .map_or(without_prefix, |code| code.as_str())
        .to_string()
}

fn specialty_or_default(code: String) -> String {
    if code.is_empty() {
        DEFAULT_SPECIALTY.to_string()
    } else {
        code
    }
}

/// A row that survived classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Output(OutputRecord),
    /// Non-member receiving a condition-indicative drug.
    Review(ReviewRecord),
    /// Member medication whose date is blank or unparseable.
    MissingDate(MissingDateRecord),
}

#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    index: &'a PopulationIndex,
    rules: &'a Rules,
    resolver: Resolver<'a>,
}

impl<'a> Classifier<'a> {
    pub fn new(index: &'a PopulationIndex, rules: &'a Rules) -> Self {
        Self {
            index,
            rules,
            resolver: Resolver::new(index, rules),
        }
    }

    pub fn classify_visit(&self, row: &VisitRow) -> Result<Classified, SkipReason> {
        let identifier = row.id.identifier().ok_or(SkipReason::InvalidIdentifier)?;
        let condition = self
            .index
            .condition_of(&identifier)
            .ok_or(SkipReason::NotMember)?;
        if !self.rules.is_valid_state(&row.state) {
            return Err(SkipReason::InvalidState);
        }
        if !self.rules.allows_specialty(condition, &row.specialty_code) {
            return Err(SkipReason::SpecialtyNotAllowed);
        }
        let code = self
            .resolver
            .resolve_visit_code(&row.specialty_code, condition, &identifier)
            .into_result()?;
        let date = format_event_date(&row.date);
        if date.date.is_none() && !date.is_blank() {
            return Err(SkipReason::InvalidDate);
        }
        let specialty = match condition {
            Condition::Palliative => PALLIATIVE_SPECIALTY.to_string(),
            _ => specialty_or_default(row.specialty_code.trim().to_string()),
        };
        Ok(Classified::Output(OutputRecord {
            date: date.date,
            date_text: date.text,
            identifier,
            code,
            condition,
            family_code: condition.family_code().to_string(),
            specialty,
        }))
    }

    pub fn classify_medication(&self, row: &MedicationRow) -> Result<Classified, SkipReason> {
        let identifier = row.id.identifier().ok_or(SkipReason::InvalidIdentifier)?;
        let Some(condition) = self.index.condition_of(&identifier) else {
            return match self.rules.review_category(&row.drug) {
                Some(category) => Ok(Classified::Review(ReviewRecord {
                    identifier,
                    drug: row.drug.trim().to_string(),
                    category,
                    dispensed_on: format_event_date(&row.date).text,
                })),
                None => Err(SkipReason::NotMember),
            };
        };
        let code = self
            .resolver
            .resolve_medication_code(&row.drug, condition, &identifier)
            .into_result()?;
        let date = format_event_date(&row.date);
        if date.date.is_none() {
            return Ok(Classified::MissingDate(MissingDateRecord {
                identifier,
                drug: row.drug.trim().to_string(),
                quantity: row.quantity.trim().to_string(),
                location: row.location.trim().to_string(),
                date_text: row.date.trim().to_string(),
                origin: row.origin,
            }));
        }
        let specialty = match condition {
            Condition::Palliative => PALLIATIVE_SPECIALTY.to_string(),
            _ => specialty_or_default(clean_location(&row.location)),
        };
        Ok(Classified::Output(OutputRecord {
            date: date.date,
            date_text: date.text,
            identifier,
            code,
            condition,
            family_code: condition.family_code().to_string(),
            specialty,
        }))
    }
}
