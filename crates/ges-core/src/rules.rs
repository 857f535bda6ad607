//! Classification rules: drug keyword families, specialty whitelists and
//! valid visit states.
//!
//! The default rule set is embedded at compile time; a deployment can
//! replace it with its own TOML document. Keywords and states are folded
//! (upper-case, no accents) once at load so matching is a plain substring
//! test.

use std::path::{Path, PathBuf};

use ges_model::text::fold_upper;
use ges_model::{Condition, ProcedureCode, ReviewCategory, SeverityTier};
use serde::Deserialize;

/// Default rules document.
pub const DEFAULT_RULES: &str = include_str!("../data/rules.toml");

#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("failed to read rules file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rules document: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid rules: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rules {
    pub visits: VisitRules,
    pub medications: MedicationRules,
    pub review: ReviewRules,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisitRules {
    pub valid_states: Vec<String>,
    pub specialties: SpecialtyWhitelists,
}

/// Specialty codes under which a visit counts for each condition.
/// Visits of members with an unknown condition never qualify.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecialtyWhitelists {
    #[serde(default)]
    pub epoc: Vec<String>,
    #[serde(default)]
    pub asthma: Vec<String>,
    #[serde(default)]
    pub fibrosis: Vec<String>,
    #[serde(default)]
    pub palliative: Vec<String>,
}

impl SpecialtyWhitelists {
    pub fn for_condition(&self, condition: Condition) -> &[String] {
        match condition {
            Condition::Epoc => &self.epoc,
            Condition::Asthma => &self.asthma,
            Condition::Fibrosis => &self.fibrosis,
            Condition::Palliative => &self.palliative,
            Condition::Unknown => &[],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MedicationRules {
    pub asthma: AsthmaRules,
    pub fibrosis: FibrosisRules,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AsthmaRules {
    /// Code used when no family matches.
    pub default_code: ProcedureCode,
    pub families: Vec<KeywordFamily>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FibrosisRules {
    /// Codes used when no drug family matches.
    pub severity_codes: SeverityCodes,
    pub families: Vec<KeywordFamily>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeverityCodes {
    pub mild: ProcedureCode,
    pub moderate: ProcedureCode,
    pub severe: ProcedureCode,
}

impl SeverityCodes {
    pub fn code(&self, tier: SeverityTier) -> &ProcedureCode {
        match tier {
            SeverityTier::Mild => &self.mild,
            SeverityTier::Moderate => &self.moderate,
            SeverityTier::Severe => &self.severe,
        }
    }
}

/// Named group of drug keywords that maps to one procedure code.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordFamily {
    pub name: String,
    pub keywords: Vec<String>,
    pub code: ProcedureCode,
}

impl KeywordFamily {
    /// `folded_drug` must already be folded with [`fold_upper`].
    pub fn matches(&self, folded_drug: &str) -> bool {
        matches_any(&self.keywords, folded_drug)
    }

    /// First family, in order, with a keyword contained in the drug text.
    pub fn first_match<'a>(families: &'a [KeywordFamily], folded_drug: &str) -> Option<&'a Self> {
        families.iter().find(|family| family.matches(folded_drug))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewRules {
    pub families: Vec<ReviewFamily>,
}

/// Keywords that mark a drug as indicative of a condition.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewFamily {
    pub category: ReviewCategory,
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn matches_any(keywords: &[String], folded_drug: &str) -> bool {
    keywords
        .iter()
        .any(|keyword| folded_drug.contains(keyword.as_str()))
}

fn fold_all(values: &mut [String]) {
    for value in values {
        *value = fold_upper(value.trim());
    }
}

fn check_keywords(scope: &str, keywords: &[String]) -> Result<(), RulesError> {
    if keywords.iter().any(String::is_empty) {
        return Err(RulesError::Invalid(format!("{scope}: blank keyword")));
    }
    Ok(())
}

impl Rules {
    /// Rules compiled into the binary.
    pub fn embedded() -> Result<Self, RulesError> {
        Self::from_toml_str(DEFAULT_RULES)
    }

    pub fn from_path(path: &Path) -> Result<Self, RulesError> {
        let text = std::fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, RulesError> {
        let mut rules: Rules = toml::from_str(text)?;
        rules.prepare()?;
        Ok(rules)
    }

    fn prepare(&mut self) -> Result<(), RulesError> {
        fold_all(&mut self.visits.valid_states);
        if self.visits.valid_states.iter().all(String::is_empty) {
            return Err(RulesError::Invalid(
                "visits.valid_states must name at least one state".to_string(),
            ));
        }
        let specialties = &mut self.visits.specialties;
        for list in [
            &mut specialties.epoc,
            &mut specialties.asthma,
            &mut specialties.fibrosis,
            &mut specialties.palliative,
        ] {
            for code in list.iter_mut() {
                *code = code.trim().to_string();
            }
        }
        let medications = &mut self.medications;
        for (scope, families) in [
            ("medications.asthma", &mut medications.asthma.families),
            ("medications.fibrosis", &mut medications.fibrosis.families),
        ] {
            for family in families.iter_mut() {
                fold_all(&mut family.keywords);
                if family.keywords.is_empty() {
                    return Err(RulesError::Invalid(format!(
                        "{scope}.{}: family has no keywords",
                        family.name
                    )));
                }
                check_keywords(&format!("{scope}.{}", family.name), &family.keywords)?;
            }
        }
        for family in &mut self.review.families {
            fold_all(&mut family.keywords);
            check_keywords(
                &format!("review.{}", family.category.as_str()),
                &family.keywords,
            )?;
        }
        Ok(())
    }

    /// True when the visit state counts as attended.
    pub fn is_valid_state(&self, state: &str) -> bool {
        let folded = fold_upper(state.trim());
        self.visits.valid_states.contains(&folded)
    }

    pub fn allows_specialty(&self, condition: Condition, specialty_code: &str) -> bool {
        let code = specialty_code.trim();
        self.visits
            .specialties
            .for_condition(condition)
            .iter()
            .any(|allowed| allowed == code)
    }

    /// Category of the first review family whose keywords occur in `drug`.
    pub fn review_category(&self, drug: &str) -> Option<ReviewCategory> {
        let folded = fold_upper(drug);
        self.review
            .families
            .iter()
            .find(|family| matches_any(&family.keywords, &folded))
            .map(|family| family.category)
    }
}
