//! Evaluate submissions and persist the report

use anyhow::{Context, Result};
use jetsim_evaluation::report::write_report;
use jetsim_evaluation::SubmissionSelector;
use tracing::info;

use super::CommandContext;
use crate::output::{colors, render_report};

/// Run the evaluation. Returns whether every unit scored.
pub async fn run(ctx: &CommandContext, selector: &SubmissionSelector) -> Result<bool> {
    let mut orchestrator = ctx.orchestrator();
    let report = orchestrator
        .run(selector)
        .await
        .context("Failed to load submissions")?;

    let path = write_report(&report, &ctx.config.paths.output_dir)
        .context("Failed to write evaluation report")?;
    info!(path = %path.display(), run_id = %report.run_id, "Report written");

    println!("{}", render_report(&report, ctx.format)?);

    let clean = report.is_clean();
    let status = if clean {
        colors::success("All evaluations succeeded")
    } else {
        colors::warning("Some evaluations failed")
    };
    eprintln!(
        "{} {} {}",
        status,
        colors::dim("report:"),
        path.display()
    );

    Ok(clean)
}
