//! Closed enumerations for program concepts that arrive as free text.
//!
//! Reference spreadsheets label conditions, severities and progression codes
//! with loosely formatted Spanish text. Parsing them into enums once, at load
//! time, keeps string comparisons out of the classification rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;
use crate::text::fold_upper;

/// Chronic-disease program condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// Chronic obstructive pulmonary disease.
    Epoc,
    /// Bronchial asthma.
    Asthma,
    /// Cystic fibrosis.
    Fibrosis,
    /// Pain relief and palliative care for advanced cancer.
    Palliative,
    /// Label accepted in lenient mode that matched none of the above.
    Unknown,
}

impl Condition {
    /// The four program conditions, in reporting order.
    pub const KNOWN: [Condition; 4] = [
        Condition::Epoc,
        Condition::Asthma,
        Condition::Fibrosis,
        Condition::Palliative,
    ];

    /// Label as it appears in the population registry.
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Epoc => "EPOC",
            Condition::Asthma => "ASMA",
            Condition::Fibrosis => "Fibrosis",
            Condition::Palliative => "Paliativos",
            Condition::Unknown => "Desconocida",
        }
    }

    /// Program family ("PS") code written to the load files.
    pub fn family_code(&self) -> &'static str {
        match self {
            Condition::Epoc => "38",
            Condition::Asthma => "61",
            Condition::Fibrosis => "51",
            Condition::Palliative => "4",
            Condition::Unknown => "",
        }
    }

    /// Parse a registry label, accepting short tags and the full program names.
    pub fn parse_label(raw: &str) -> Option<Self> {
        let folded = fold_upper(raw);
        let label = folded.trim();
        match label {
            "EPOC" | "ENFERMEDAD PULMONAR OBSTRUCTIVA CRONICA" => Some(Condition::Epoc),
            "ASMA" | "ASMA BRONQUIAL" => Some(Condition::Asthma),
            "FIBROSIS" | "FIBROSIS QUISTICA" | "FQ" => Some(Condition::Fibrosis),
            "PALIATIVOS" | "PALIATIVO" | "ALIVIO DEL DOLOR" | "CUIDADOS PALIATIVOS" => {
                Some(Condition::Palliative)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Condition {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_label(s).ok_or_else(|| ModelError::UnknownCondition(s.to_string()))
    }
}

/// Origin of a medication row; the two feeds are unioned into one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MedicationOrigin {
    /// Pharmacy dispensation, dated by `FechaDespacho`.
    Dispensation,
    /// Prescription export, dated by `FechaEmision`.
    Prescription,
}

impl MedicationOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationOrigin::Dispensation => "farmacia",
            MedicationOrigin::Prescription => "recetas",
        }
    }
}

impl fmt::Display for MedicationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Palliative sub-classification for one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgressionStatus {
    Progressive,
    NonProgressive,
    /// The identifier has a row but the classification cell is blank.
    UnresolvedEmpty,
    /// No classification row matched the identifier.
    UnresolvedNotFound,
}

impl ProgressionStatus {
    /// Raw codes that denote a non-progressive case; everything else is progressive.
    pub const NON_PROGRESSIVE_CODES: [&'static str; 4] = ["CP-NO", "DC-NO", "DO NO", "NP"];

    /// Reduce a raw classification cell.
    pub fn from_raw(raw: &str) -> Self {
        if crate::text::is_blank_marker(raw) {
            return ProgressionStatus::UnresolvedEmpty;
        }
        let code = raw.trim().to_uppercase();
        if Self::NON_PROGRESSIVE_CODES.contains(&code.as_str()) {
            ProgressionStatus::NonProgressive
        } else {
            ProgressionStatus::Progressive
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(
            self,
            ProgressionStatus::Progressive | ProgressionStatus::NonProgressive
        )
    }
}

/// Fibrosis sub-classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityTier {
    #[default]
    Mild,
    Moderate,
    Severe,
}

impl SeverityTier {
    /// Parse the free-text severity cell; `None` when unrecognized or blank.
    pub fn parse(raw: &str) -> Option<Self> {
        let folded = fold_upper(raw);
        match folded.trim() {
            "LEVE" => Some(SeverityTier::Mild),
            "MODERADO" | "MODERADA" => Some(SeverityTier::Moderate),
            "SEVERO" | "SEVERA" | "GRAVE" => Some(SeverityTier::Severe),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityTier::Mild => "leve",
            SeverityTier::Moderate => "moderada",
            SeverityTier::Severe => "grave",
        }
    }
}

/// Drug family detected on a non-member's medication row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewCategory {
    Palliative,
    Asthma,
    Fibrosis,
    Epoc,
}

impl ReviewCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewCategory::Palliative => "PALIATIVO",
            ReviewCategory::Asthma => "ASMA",
            ReviewCategory::Fibrosis => "FIBROSIS_QUISTICA",
            ReviewCategory::Epoc => "EPOC",
        }
    }

    pub fn condition(&self) -> Condition {
        match self {
            ReviewCategory::Palliative => Condition::Palliative,
            ReviewCategory::Asthma => Condition::Asthma,
            ReviewCategory::Fibrosis => Condition::Fibrosis,
            ReviewCategory::Epoc => Condition::Epoc,
        }
    }
}

impl fmt::Display for ReviewCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
