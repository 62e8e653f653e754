//! Load and validate submissions without evaluating them

use anyhow::{Context, Result};
use jetsim_evaluation::SubmissionSelector;

use super::CommandContext;
use crate::output::{colors, render_load_summary, LoadSummary};

/// Load the selected submissions and list their sample sets.
/// Returns whether every submission loaded.
pub fn run(ctx: &CommandContext, selector: &SubmissionSelector) -> Result<bool> {
    let orchestrator = ctx.orchestrator();
    let outcome = orchestrator
        .load_submissions(selector)
        .context("Failed to load submissions")?;

    let summary = LoadSummary::from(&outcome);
    println!("{}", render_load_summary(&summary, ctx.format)?);

    if !summary.load_failures.is_empty() {
        eprintln!(
            "{}",
            colors::error(&format!(
                "{} submission(s) failed to load",
                summary.load_failures.len()
            ))
        );
    }

    Ok(summary.load_failures.is_empty())
}
