//! Output formatting for CLI

use anyhow::Result;
use jetsim_domain::EvaluationReport;
use jetsim_evaluation::LoadOutcome;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod formatters;
mod table;

pub use formatters::JsonFormatter;
pub use table::TableFormatter;

/// Output format enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Table output (default)
    #[default]
    Table,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Table => write!(f, "table"),
        }
    }
}

/// Loaded submission as shown by `--no-evaluate`
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionSummary {
    pub name: String,
    pub sample_sets: Vec<SampleSetSummary>,
}

/// One declared sample set
#[derive(Debug, Clone, Serialize)]
pub struct SampleSetSummary {
    pub dataset: String,
    pub data_class: String,
    pub download_path: PathBuf,
    pub downloaded: bool,
}

/// Serializable view of a [`LoadOutcome`]
#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub submissions: Vec<SubmissionSummary>,
    pub load_failures: Vec<jetsim_domain::LoadFailure>,
}

impl From<&LoadOutcome> for LoadSummary {
    fn from(outcome: &LoadOutcome) -> Self {
        let submissions = outcome
            .submissions
            .iter()
            .map(|submission| SubmissionSummary {
                name: submission.name().to_string(),
                sample_sets: submission
                    .samples()
                    .values()
                    .flat_map(|classes| classes.values())
                    .map(|set| SampleSetSummary {
                        dataset: set.dataset().to_string(),
                        data_class: set.data_class().to_string(),
                        download_path: set.download_path().to_path_buf(),
                        downloaded: set.is_downloaded(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            submissions,
            load_failures: outcome.failures.clone(),
        }
    }
}

/// Render an evaluation report
pub fn render_report(report: &EvaluationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => JsonFormatter::format(report),
        OutputFormat::Table => Ok(TableFormatter::report(report)),
    }
}

/// Render the result of loading submissions
pub fn render_load_summary(summary: &LoadSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => JsonFormatter::format(summary),
        OutputFormat::Table => Ok(TableFormatter::load_summary(summary)),
    }
}

/// Color helpers
pub mod colors {
    use colored::*;

    pub fn success(s: &str) -> ColoredString {
        s.green()
    }

    pub fn error(s: &str) -> ColoredString {
        s.red()
    }

    pub fn warning(s: &str) -> ColoredString {
        s.yellow()
    }

    pub fn dim(s: &str) -> ColoredString {
        s.dimmed()
    }
}
