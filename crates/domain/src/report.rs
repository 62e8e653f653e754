//! Evaluation report, the persisted outcome of one run.

use crate::errors::{ErrorCategory, EvalError};
use crate::scores::Scores;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Results of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Keyed by submission name
    pub submissions: BTreeMap<String, SubmissionReport>,
    /// Submissions whose metadata could not be loaded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load_failures: Vec<LoadFailure>,
}

impl EvaluationReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            submissions: BTreeMap::new(),
            load_failures: Vec::new(),
        }
    }

    /// Number of successfully scored pairs across submissions
    pub fn scored_count(&self) -> usize {
        self.submissions
            .values()
            .flat_map(|s| s.results.values())
            .map(BTreeMap::len)
            .sum()
    }

    /// Number of failed pairs across submissions
    pub fn failure_count(&self) -> usize {
        self.submissions.values().map(|s| s.failures.len()).sum()
    }

    /// True when nothing failed
    pub fn is_clean(&self) -> bool {
        self.load_failures.is_empty() && self.failure_count() == 0
    }
}

impl Default for EvaluationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Results for one submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionReport {
    /// dataset -> data_class -> scores
    pub results: BTreeMap<String, BTreeMap<String, Scores>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<UnitFailure>,
}

impl SubmissionReport {
    pub fn record(&mut self, dataset: &str, data_class: &str, scores: Scores) {
        self.results
            .entry(dataset.to_string())
            .or_default()
            .insert(data_class.to_string(), scores);
    }

    pub fn record_failure(&mut self, dataset: &str, data_class: &str, error: &EvalError) {
        self.failures
            .push(UnitFailure::from_error(dataset, data_class, error));
    }
}

/// A (dataset, data_class) pair that could not be scored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitFailure {
    pub dataset: String,
    pub data_class: String,
    pub code: String,
    pub category: ErrorCategory,
    pub message: String,
}

impl UnitFailure {
    pub fn from_error(dataset: &str, data_class: &str, error: &EvalError) -> Self {
        Self {
            dataset: dataset.to_string(),
            data_class: data_class.to_string(),
            code: error.error_code().to_string(),
            category: error.category(),
            message: error.to_string(),
        }
    }
}

/// A submission whose metadata could not be loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadFailure {
    pub submission: String,
    pub code: String,
    pub message: String,
}

impl LoadFailure {
    pub fn from_error(submission: &str, error: &EvalError) -> Self {
        Self {
            submission: submission.to_string(),
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PreconditionError;

    fn scores() -> Scores {
        Scores {
            w1m: (0.1, 0.0),
            w1p: (0.2, 0.0),
            fpd: 0.3,
            kpd: 0.4,
        }
    }

    #[test]
    fn test_counts() {
        let mut submission = SubmissionReport::default();
        submission.record("jetnet", "g30", scores());
        submission.record("jetnet", "t30", scores());
        let err: EvalError = PreconditionError::SamplesNotLoaded {
            dataset: "jetnet".into(),
            data_class: "q30".into(),
        }
        .into();
        submission.record_failure("jetnet", "q30", &err);

        let mut report = EvaluationReport::new();
        report.submissions.insert("mp-gan".into(), submission);

        assert_eq!(report.scored_count(), 2);
        assert_eq!(report.failure_count(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_failure_carries_code() {
        let err: EvalError = PreconditionError::NotDownloaded("g30.hdf5".into()).into();
        let failure = UnitFailure::from_error("jetnet", "g30", &err);
        assert_eq!(failure.code, "NOT_DOWNLOADED");
        assert_eq!(failure.category, ErrorCategory::Precondition);
    }
}
