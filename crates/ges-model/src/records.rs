//! Raw input rows and the records produced by a reconciliation run.
//!
//! Raw rows keep every cell as text exactly as read; identifier normalization
//! and date parsing happen in the classification stage so that every table
//! goes through the same code path.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Condition, Identifier, MedicationOrigin, ProcedureCode, ReviewCategory};

/// Fixed program tag written to every load-file row.
pub const PROGRAM_TAG: &str = "AUGE";

/// Reason written on every review record.
pub const REVIEW_REASON: &str = "PACIENTE NO ESTÁ EN POBLACIÓN GES";

/// Action recommended on every review record.
pub const REVIEW_ACTION: &str = "VERIFICAR SI DEBE INCLUIRSE EN GES";

/// Identifier cells as read from a table.
///
/// When `check` is blank, `body` may hold a combined `"body-check"` value or,
/// in loosely formatted reference data, a bare body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIdentifier {
    pub body: String,
    pub check: String,
}

impl RawIdentifier {
    pub fn combined(value: impl Into<String>) -> Self {
        Self {
            body: value.into(),
            check: String::new(),
        }
    }

    pub fn split(body: impl Into<String>, check: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            check: check.into(),
        }
    }

    /// Normalize to a full identifier, if both parts are usable.
    pub fn identifier(&self) -> Option<Identifier> {
        if self.check.trim().is_empty() {
            Identifier::parse_combined(&self.body)
        } else {
            Identifier::normalize(&self.body, &self.check)
        }
    }

    /// Numeric body only, ignoring any check character.
    pub fn body_number(&self) -> Option<u64> {
        Identifier::parse_body(&self.body)
    }
}

/// Row of the eligible-population registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRow {
    pub id: RawIdentifier,
    pub condition: String,
}

/// Row of a sub-classification table (progression or severity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRow {
    pub id: String,
    pub value: String,
}

/// Outpatient visit as exported by the scheduling system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRow {
    pub id: RawIdentifier,
    pub date: String,
    pub specialty_code: String,
    pub specialty_desc: String,
    pub state: String,
}

/// Dispensation or prescription row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationRow {
    pub id: RawIdentifier,
    pub date: String,
    pub drug: String,
    pub quantity: String,
    pub location: String,
    pub origin: MedicationOrigin,
}

/// One row of a load file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Parsed event date; `None` when the source text did not parse.
    pub date: Option<NaiveDate>,
    /// Date as written to the load file.
    pub date_text: String,
    pub identifier: Identifier,
    pub code: ProcedureCode,
    pub condition: Condition,
    pub family_code: String,
    pub specialty: String,
}

impl OutputRecord {
    pub fn program_tag(&self) -> &'static str {
        PROGRAM_TAG
    }

    /// `(identifier, code)` key at which load files are unique.
    pub fn dedupe_key(&self) -> (Identifier, &str) {
        (self.identifier, self.code.as_str())
    }

    /// Cells in load-file column order.
    pub fn cells(&self) -> [String; 7] {
        [
            self.date_text.clone(),
            self.identifier.body().to_string(),
            self.identifier.check().to_string(),
            self.code.to_string(),
            PROGRAM_TAG.to_string(),
            self.family_code.clone(),
            self.specialty.clone(),
        ]
    }
}

/// Non-member receiving a condition-indicative drug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub identifier: Identifier,
    pub drug: String,
    pub category: ReviewCategory,
    pub dispensed_on: String,
}

/// Medication row excluded from the load file for lack of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingDateRecord {
    pub identifier: Identifier,
    pub drug: String,
    pub quantity: String,
    pub location: String,
    pub date_text: String,
    pub origin: MedicationOrigin,
}

/// Coverage of one population member across both encounter streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReportRow {
    pub body: String,
    pub check: String,
    pub condition: String,
    pub visit_count: usize,
    pub visit_specialties: Vec<String>,
    pub medication_count: usize,
    pub medication_locations: Vec<String>,
}

impl CrossReportRow {
    pub fn had_visit(&self) -> bool {
        self.visit_count > 0
    }

    pub fn had_medication(&self) -> bool {
        self.medication_count > 0
    }

    pub fn coverage(&self) -> Coverage {
        match (self.had_visit(), self.had_medication()) {
            (true, true) => Coverage::Complete,
            (true, false) => Coverage::VisitOnly,
            (false, true) => Coverage::MedicationOnly,
            (false, false) => Coverage::Missing,
        }
    }
}

/// Which encounter streams mention a population member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Coverage {
    Complete,
    VisitOnly,
    MedicationOnly,
    Missing,
}
