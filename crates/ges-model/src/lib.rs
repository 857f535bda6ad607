//! Data model for GES load-file reconciliation.

pub mod enums;
pub mod error;
pub mod ids;
pub mod lookup;
pub mod records;
pub mod text;

pub use enums::{Condition, MedicationOrigin, ProgressionStatus, ReviewCategory, SeverityTier};
pub use error::{ModelError, Result};
pub use ids::{Identifier, ProcedureCode, normalize_code};
pub use lookup::CaseInsensitiveSet;
pub use records::{
    ClassificationRow, Coverage, CrossReportRow, MedicationRow, MissingDateRecord, OutputRecord,
    PROGRAM_TAG, PopulationRow, REVIEW_ACTION, REVIEW_REASON, RawIdentifier, ReviewRecord,
    VisitRow,
};
