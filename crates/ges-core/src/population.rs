//! Eligible-population index and the condition sub-classification tables.
//!
//! Built once per run from the registry table plus the optional progression
//! and severity tables, then shared read-only. Classification tables are
//! keyed by numeric body since they are frequently exported without a
//! check character.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use ges_model::{
    ClassificationRow, Condition, Identifier, ModelError, PopulationRow, ProgressionStatus,
    SeverityTier, text::is_blank_marker,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::redact::redact_identifier;

#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOptions {
    /// Map unrecognized condition labels to [`Condition::Unknown`] instead
    /// of failing the load.
    pub lenient_conditions: bool,
}

/// One registry entry, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub body: u64,
    /// `None` for bare-body registry rows.
    pub check: Option<char>,
    pub condition: Condition,
}

/// Why a severity lookup fell back to [`SeverityTier::Mild`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityDefault {
    MissingTable,
    NotFound,
    Blank,
    Unrecognized,
}

impl SeverityDefault {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityDefault::MissingTable => "severity table not provided",
            SeverityDefault::NotFound => "identifier not in severity table",
            SeverityDefault::Blank => "severity field empty",
            SeverityDefault::Unrecognized => "severity value not recognized",
        }
    }
}

/// Load-time validation counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopulationReport {
    pub rows: usize,
    pub members: usize,
    pub bare_body_members: usize,
    pub duplicates: usize,
    pub invalid_identifiers: usize,
    pub unknown_labels: usize,
    pub by_condition: BTreeMap<String, usize>,
    pub progression_rows: Option<usize>,
    pub severity_rows: Option<usize>,
    /// Fibrosis members whose severity falls back to mild.
    pub severity_defaults: usize,
    /// Palliative members without a usable progression status.
    pub progression_unresolved: usize,
}

#[derive(Debug, Clone)]
pub struct PopulationIndex {
    entries: Vec<Member>,
    by_identifier: HashMap<Identifier, usize>,
    by_body: HashMap<u64, usize>,
    progression: Option<HashMap<u64, ProgressionStatus>>,
    severity: Option<HashMap<u64, String>>,
    report: PopulationReport,
}

#[derive(Debug, Clone, Copy)]
enum MemberKey {
    Full(Identifier),
    Body(u64),
}

fn insert_first<K: Hash + Eq>(map: &mut HashMap<K, usize>, key: K, position: usize) -> bool {
    match map.entry(key) {
        Entry::Occupied(_) => false,
        Entry::Vacant(slot) => {
            slot.insert(position);
            true
        }
    }
}

fn classification_map<T>(
    rows: &[ClassificationRow],
    mut convert: impl FnMut(&str) -> T,
) -> HashMap<u64, T> {
    let mut map = HashMap::with_capacity(rows.len());
    for row in rows {
        let Some(body) = Identifier::parse_body(&row.id) else {
            continue;
        };
        map.entry(body).or_insert_with(|| convert(&row.value));
    }
    map
}

impl PopulationIndex {
    pub fn build(
        population: &[PopulationRow],
        progression: Option<&[ClassificationRow]>,
        severity: Option<&[ClassificationRow]>,
        options: IndexOptions,
    ) -> Result<Self, ModelError> {
        let mut index = Self {
            entries: Vec::new(),
            by_identifier: HashMap::new(),
            by_body: HashMap::new(),
            progression: None,
            severity: None,
            report: PopulationReport {
                rows: population.len(),
                ..PopulationReport::default()
            },
        };

        for row in population {
            let key = match row.id.identifier() {
                Some(identifier) => MemberKey::Full(identifier),
                None => match row.id.body_number() {
                    Some(body) => MemberKey::Body(body),
                    None => {
                        index.report.invalid_identifiers += 1;
                        continue;
                    }
                },
            };
            let condition = match Condition::parse_label(&row.condition) {
                Some(condition) => condition,
                None if options.lenient_conditions => {
                    index.report.unknown_labels += 1;
                    Condition::Unknown
                }
                None => return Err(ModelError::UnknownCondition(row.condition.clone())),
            };
            let position = index.entries.len();
            let (inserted, body, check) = match key {
                MemberKey::Full(identifier) => (
                    insert_first(&mut index.by_identifier, identifier, position),
                    identifier.body(),
                    Some(identifier.check()),
                ),
                MemberKey::Body(body) => (
                    insert_first(&mut index.by_body, body, position),
                    body,
                    None,
                ),
            };
            if !inserted {
                index.report.duplicates += 1;
                continue;
            }
            if check.is_none() {
                index.report.bare_body_members += 1;
            }
            index.entries.push(Member {
                body,
                check,
                condition,
            });
            *index
                .report
                .by_condition
                .entry(condition.label().to_string())
                .or_default() += 1;
        }
        index.report.members = index.entries.len();

        if index.report.duplicates > 0 {
            warn!(
                duplicates = index.report.duplicates,
                "duplicate population identifiers; keeping first occurrence"
            );
        }
        if index.report.unknown_labels > 0 {
            warn!(
                count = index.report.unknown_labels,
                "unrecognized condition labels mapped to {}",
                Condition::Unknown.label()
            );
        }
        if index.report.invalid_identifiers > 0 {
            warn!(
                count = index.report.invalid_identifiers,
                "population rows without a usable identifier were dropped"
            );
        }

        match progression {
            Some(rows) => {
                index.report.progression_rows = Some(rows.len());
                index.progression = Some(classification_map(rows, ProgressionStatus::from_raw));
            }
            None => warn!(
                "progression table not provided; palliative medications will not be emitted"
            ),
        }
        match severity {
            Some(rows) => {
                index.report.severity_rows = Some(rows.len());
                index.severity = Some(classification_map(rows, str::to_string));
            }
            None => warn!("severity table not provided; fibrosis members default to mild"),
        }

        index.report.severity_defaults = index
            .members_with(Condition::Fibrosis)
            .filter(|member| index.severity_for_body(member.body).is_err())
            .count();
        index.report.progression_unresolved = index
            .members_with(Condition::Palliative)
            .filter(|member| !index.progression_for_body(member.body).is_resolved())
            .count();

        info!(
            members = index.report.members,
            rows = index.report.rows,
            "population index built"
        );
        Ok(index)
    }

    fn members_with(&self, condition: Condition) -> impl Iterator<Item = &Member> {
        self.entries
            .iter()
            .filter(move |member| member.condition == condition)
    }

    /// Position in [`Self::members`]: exact match first, then bare body.
    pub fn member_position(&self, identifier: &Identifier) -> Option<usize> {
        self.by_identifier
            .get(identifier)
            .or_else(|| self.by_body.get(&identifier.body()))
            .copied()
    }

    pub fn member(&self, identifier: &Identifier) -> Option<&Member> {
        self.member_position(identifier)
            .and_then(|position| self.entries.get(position))
    }

    pub fn is_member(&self, identifier: &Identifier) -> bool {
        self.member(identifier).is_some()
    }

    pub fn condition_of(&self, identifier: &Identifier) -> Option<Condition> {
        self.member(identifier).map(|member| member.condition)
    }

    pub fn progression_status(&self, identifier: &Identifier) -> ProgressionStatus {
        self.progression_for_body(identifier.body())
    }

    fn progression_for_body(&self, body: u64) -> ProgressionStatus {
        self.progression
            .as_ref()
            .and_then(|map| map.get(&body).copied())
            .unwrap_or(ProgressionStatus::UnresolvedNotFound)
    }

    /// Severity tier, or the reason it could not be determined.
    pub fn severity_lookup(&self, identifier: &Identifier) -> Result<SeverityTier, SeverityDefault> {
        self.severity_for_body(identifier.body())
    }

    fn severity_for_body(&self, body: u64) -> Result<SeverityTier, SeverityDefault> {
        let map = self.severity.as_ref().ok_or(SeverityDefault::MissingTable)?;
        let raw = map.get(&body).ok_or(SeverityDefault::NotFound)?;
        if is_blank_marker(raw) {
            return Err(SeverityDefault::Blank);
        }
        SeverityTier::parse(raw).ok_or(SeverityDefault::Unrecognized)
    }

    /// Severity tier; never fails, falling back to mild.
    pub fn severity_tier(&self, identifier: &Identifier) -> SeverityTier {
        self.severity_lookup(identifier).unwrap_or_else(|reason| {
            match reason {
                SeverityDefault::MissingTable => debug!(
                    identifier = %redact_identifier(identifier),
                    reason = reason.as_str(),
                    "severity defaulted to mild"
                ),
                _ => warn!(
                    identifier = %redact_identifier(identifier),
                    reason = reason.as_str(),
                    "severity defaulted to mild"
                ),
            }
            SeverityTier::Mild
        })
    }

    /// Registry entries in registry order, duplicates removed.
    pub fn members(&self) -> &[Member] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn report(&self) -> &PopulationReport {
        &self.report
    }
}
