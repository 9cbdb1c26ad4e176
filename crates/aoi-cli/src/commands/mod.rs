//! CLI subcommand implementations.

pub mod process;
pub mod report;
