//! Redaction of patient identifiers in log output.
//!
//! Row-level values are only logged when the operator opts in (`--log-data`);
//! otherwise every identifier field is replaced by a fixed token.

use std::sync::atomic::{AtomicBool, Ordering};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder used when row-level logging is disabled.
pub const REDACTED_VALUE: &str = "[REDACTED]";

pub fn set_log_data(enabled: bool) {
    LOG_DATA_ENABLED.store(enabled, Ordering::Release);
}

/// Returns true if row-level logging is explicitly enabled.
pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Acquire)
}

/// Returns the value when row-level logging is enabled, otherwise a redacted token.
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

/// Identifier rendered for a log field.
pub fn redact_identifier(identifier: &impl std::fmt::Display) -> String {
    if log_data_enabled() {
        identifier.to_string()
    } else {
        REDACTED_VALUE.to_string()
    }
}
