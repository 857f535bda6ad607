//! CLI library components for the GES reconciler.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
