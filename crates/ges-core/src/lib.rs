//! Classification and deduplication engine for GES load files.
//!
//! Input rows flow through the [`classifier`] (consulting the
//! [`population`] index and the [`resolver`]), are grouped per identifier and
//! collapsed by [`dedupe`], and are assembled into output tables by
//! [`assembler::reconcile`].

pub mod assembler;
pub mod classifier;
pub mod crossref;
pub mod datetime;
pub mod dedupe;
pub mod population;
pub mod redact;
pub mod resolver;
pub mod rules;
pub mod skip;

pub use assembler::{
    ReconcileInput, ReconcileOptions, ReconcileOutput, RunStats, StreamStats, reconcile,
    reconcile_with_index,
};
pub use classifier::{Classified, Classifier, clean_location};
pub use crossref::build_cross_report;
pub use datetime::{EventDate, OUTPUT_DATE_FORMAT, format_event_date, parse_event_date};
pub use dedupe::{dedupe_by_identifier, dedupe_latest};
pub use population::{IndexOptions, Member, PopulationIndex, PopulationReport, SeverityDefault};
pub use resolver::{Resolution, Resolver};
pub use rules::{DEFAULT_RULES, Rules, RulesError};
pub use skip::SkipReason;
