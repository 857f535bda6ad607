//! Procedure code resolution.
//!
//! Maps a member's condition, its sub-classification and the free-text drug
//! description to a procedure code. Fixed per-condition codes live here;
//! drug keyword families come from [`Rules`].

use ges_model::text::fold_upper;
use ges_model::{Condition, Identifier, ProcedureCode, ProgressionStatus, SeverityTier};
use tracing::trace;

use crate::population::PopulationIndex;
use crate::redact::redact_identifier;
use crate::rules::{KeywordFamily, Rules};
use crate::skip::SkipReason;

pub const VISIT_CODE_EPOC: &str = "0101110";
pub const VISIT_CODE_ASTHMA: &str = "0101113";
pub const VISIT_CODE_FIBROSIS_MILD: &str = "3004501";
pub const VISIT_CODE_FIBROSIS_MODERATE: &str = "3004502";
pub const VISIT_CODE_FIBROSIS_SEVERE: &str = "3004503";
pub const VISIT_CODE_UNKNOWN: &str = "0101322";

pub const PALLIATIVE_CODE_PROGRESSIVE: &str = "3002023";
pub const PALLIATIVE_CODE_NON_PROGRESSIVE: &str = "3002123";

pub const MEDICATION_CODE_EPOC: &str = "3801002";
pub const MEDICATION_CODE_UNKNOWN: &str = "2301001";

/// Outcome of resolving one encounter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Code(ProcedureCode),
    Skip(SkipReason),
}

impl Resolution {
    fn reference(code: &'static str) -> Self {
        Resolution::Code(ProcedureCode::from_reference(code))
    }

    pub fn into_result(self) -> Result<ProcedureCode, SkipReason> {
        match self {
            Resolution::Code(code) => Ok(code),
            Resolution::Skip(reason) => Err(reason),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a PopulationIndex,
    rules: &'a Rules,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a PopulationIndex, rules: &'a Rules) -> Self {
        Self { index, rules }
    }

    pub fn resolve_visit_code(
        &self,
        specialty: &str,
        condition: Condition,
        identifier: &Identifier,
    ) -> Resolution {
        let resolution = match condition {
            Condition::Epoc => Resolution::reference(VISIT_CODE_EPOC),
            Condition::Asthma => Resolution::reference(VISIT_CODE_ASTHMA),
            Condition::Fibrosis => match self.index.severity_tier(identifier) {
                SeverityTier::Mild => Resolution::reference(VISIT_CODE_FIBROSIS_MILD),
                SeverityTier::Moderate => Resolution::reference(VISIT_CODE_FIBROSIS_MODERATE),
                SeverityTier::Severe => Resolution::reference(VISIT_CODE_FIBROSIS_SEVERE),
            },
            // Visits are billed even when progression is unresolved.
            Condition::Palliative => match self.index.progression_status(identifier) {
                ProgressionStatus::Progressive => {
                    Resolution::reference(PALLIATIVE_CODE_PROGRESSIVE)
                }
                ProgressionStatus::NonProgressive
                | ProgressionStatus::UnresolvedEmpty
                | ProgressionStatus::UnresolvedNotFound => {
                    Resolution::reference(PALLIATIVE_CODE_NON_PROGRESSIVE)
                }
            },
            Condition::Unknown => Resolution::reference(VISIT_CODE_UNKNOWN),
        };
        trace!(
            identifier = %redact_identifier(identifier),
            condition = %condition,
            specialty,
            ?resolution,
            "resolved visit code"
        );
        resolution
    }

    pub fn resolve_medication_code(
        &self,
        drug: &str,
        condition: Condition,
        identifier: &Identifier,
    ) -> Resolution {
        let folded = fold_upper(drug);
        let medications = &self.rules.medications;
        let resolution = match condition {
            Condition::Epoc => Resolution::reference(MEDICATION_CODE_EPOC),
            Condition::Asthma => Resolution::Code(
                KeywordFamily::first_match(&medications.asthma.families, &folded)
                    .map_or(&medications.asthma.default_code, |family| &family.code)
                    .clone(),
            ),
            Condition::Fibrosis => {
                match KeywordFamily::first_match(&medications.fibrosis.families, &folded) {
                    Some(family) => Resolution::Code(family.code.clone()),
                    None => {
                        let tier = self.index.severity_tier(identifier);
                        Resolution::Code(medications.fibrosis.severity_codes.code(tier).clone())
                    }
                }
            }
            Condition::Palliative => match self.index.progression_status(identifier) {
                ProgressionStatus::Progressive => {
                    Resolution::reference(PALLIATIVE_CODE_PROGRESSIVE)
                }
                ProgressionStatus::NonProgressive => {
                    Resolution::reference(PALLIATIVE_CODE_NON_PROGRESSIVE)
                }
                ProgressionStatus::UnresolvedEmpty => {
                    Resolution::Skip(SkipReason::ProgressionEmpty)
                }
                ProgressionStatus::UnresolvedNotFound => {
                    Resolution::Skip(SkipReason::ProgressionNotFound)
                }
            },
            Condition::Unknown => Resolution::reference(MEDICATION_CODE_UNKNOWN),
        };
        trace!(
            identifier = %redact_identifier(identifier),
            condition = %condition,
            ?resolution,
            "resolved medication code"
        );
        resolution
    }
}
