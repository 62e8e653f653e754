//! JetSim CLI Library
//!
//! Wiring and output for the `jetsim` binary: building the evaluation
//! pipeline from configuration, running it, and rendering reports.

pub mod commands;
pub mod output;

pub use commands::CommandContext;
pub use output::{JsonFormatter, OutputFormat, TableFormatter};

/// Re-export common types
pub use anyhow::{Context, Result};
