use serde::Serialize;
use std::fmt;

/// Why an encounter row produced no load-file record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The identifier cells did not normalize.
    InvalidIdentifier,
    /// Not in the eligible population and, for medications, no indicative drug.
    NotMember,
    /// Visit state is not an attended state.
    InvalidState,
    /// Visit specialty is not whitelisted for the member's condition.
    SpecialtyNotAllowed,
    /// Palliative medication whose progression field is empty.
    ProgressionEmpty,
    /// Palliative medication with no progression row.
    ProgressionNotFound,
    /// Visit date present but not in any accepted format.
    InvalidDate,
    /// Record reached the assembler without a date.
    BlankDate,
}

impl SkipReason {
    pub const ALL: [SkipReason; 8] = [
        SkipReason::InvalidIdentifier,
        SkipReason::NotMember,
        SkipReason::InvalidState,
        SkipReason::SpecialtyNotAllowed,
        SkipReason::ProgressionEmpty,
        SkipReason::ProgressionNotFound,
        SkipReason::InvalidDate,
        SkipReason::BlankDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::InvalidIdentifier => "invalid_identifier",
            SkipReason::NotMember => "not_member",
            SkipReason::InvalidState => "invalid_state",
            SkipReason::SpecialtyNotAllowed => "specialty_not_allowed",
            SkipReason::ProgressionEmpty => "progression_empty",
            SkipReason::ProgressionNotFound => "progression_not_found",
            SkipReason::InvalidDate => "invalid_date",
            SkipReason::BlankDate => "blank_date",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
