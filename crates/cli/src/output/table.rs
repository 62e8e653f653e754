//! Table formatting utilities

use super::LoadSummary;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, *};
use jetsim_domain::{EvaluationReport, Scores};

/// Table formatter
pub struct TableFormatter;

impl TableFormatter {
    /// Create a new table with default styling
    pub fn new() -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }

    /// Scores, then any unit and load failures
    pub fn report(report: &EvaluationReport) -> String {
        let mut scores = Self::new();
        let mut header = vec!["Submission", "Dataset", "Class"];
        header.extend(Scores::KEYS);
        scores.set_header(header);

        for (name, submission) in &report.submissions {
            for (dataset, classes) in &submission.results {
                for (data_class, result) in classes {
                    let values = result.to_map();
                    let mut row = vec![name.clone(), dataset.clone(), data_class.clone()];
                    row.extend(Scores::KEYS.iter().map(|key| values[key].to_string()));
                    scores.add_row(row);
                }
            }
        }

        let mut out = scores.to_string();

        if !report.is_clean() {
            let mut failures = Self::new();
            failures.set_header(vec!["Submission", "Dataset", "Class", "Code", "Message"]);

            for failure in &report.load_failures {
                failures.add_row(vec![
                    failure.submission.clone(),
                    "-".to_string(),
                    "-".to_string(),
                    failure.code.clone(),
                    failure.message.clone(),
                ]);
            }
            for (name, submission) in &report.submissions {
                for failure in &submission.failures {
                    failures.add_row(vec![
                        name.clone(),
                        failure.dataset.clone(),
                        failure.data_class.clone(),
                        failure.code.clone(),
                        failure.message.clone(),
                    ]);
                }
            }

            out.push('\n');
            out.push_str(&failures.to_string());
        }

        out
    }

    /// Declared sample sets of the loaded submissions
    pub fn load_summary(summary: &LoadSummary) -> String {
        let mut table = Self::new();
        table.set_header(vec!["Submission", "Dataset", "Class", "Downloaded", "Path"]);

        for submission in &summary.submissions {
            for set in &submission.sample_sets {
                table.add_row(vec![
                    submission.name.clone(),
                    set.dataset.clone(),
                    set.data_class.clone(),
                    if set.downloaded { "yes" } else { "no" }.to_string(),
                    set.download_path.display().to_string(),
                ]);
            }
        }
        for failure in &summary.load_failures {
            table.add_row(vec![
                failure.submission.clone(),
                "-".to_string(),
                "-".to_string(),
                failure.code.clone(),
                failure.message.clone(),
            ]);
        }

        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetsim_domain::{EvalError, SubmissionReport};

    #[test]
    fn test_report_lists_failures() {
        let mut submission = SubmissionReport::default();
        submission.record_failure("jetnet", "t30", &EvalError::metric("empty batch"));
        let mut report = EvaluationReport::new();
        report.submissions.insert("mp-gan".to_string(), submission);

        let table = TableFormatter::report(&report);
        assert!(table.contains("METRIC_ERROR"));
        assert!(table.contains("empty batch"));
    }

    #[test]
    fn test_clean_report_has_single_table() {
        let table = TableFormatter::report(&EvaluationReport::new());
        assert!(table.contains("w1m"));
        assert!(!table.contains("Code"));
    }
}
