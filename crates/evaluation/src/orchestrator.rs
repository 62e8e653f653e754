//! The run loop: submissions, then their (dataset, data_class) pairs.
//!
//! Every pair is evaluated inside its own failure boundary. A failing pair is
//! recorded in the report and the run moves on to the next one.

use crate::evaluator::MetricsEvaluator;
use crate::ports::SampleIo;
use crate::resolver::RealDataResolver;
use crate::samples::SampleSet;
use crate::submission::{discover_submissions, load_submission, Submission};
use jetsim_common::config::{EvaluationSettings, PathsConfig};
use jetsim_domain::{
    ConfigurationError, EvalError, EvalResult, EvaluationReport, LoadFailure, Scores,
    SubmissionReport,
};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{error, info, instrument, warn};

/// Which submissions a run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionSelector {
    /// Every subdirectory of the submission directory
    All,
    /// A single submission by name
    Named(String),
}

impl SubmissionSelector {
    /// `"all"` selects every submission, anything else a single one
    pub fn parse(value: &str) -> Self {
        if value == "all" {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }
}

/// Submissions that loaded, and those that did not
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub submissions: Vec<Submission>,
    pub failures: Vec<LoadFailure>,
}

/// Drives loading and evaluation of submissions
pub struct Orchestrator {
    paths: PathsConfig,
    settings: EvaluationSettings,
    resolver: RealDataResolver,
    sample_io: SampleIo,
    evaluator: MetricsEvaluator,
    overwrite: bool,
    real_cache: HashMap<(String, String), SampleSet>,
}

impl Orchestrator {
    pub fn new(
        paths: PathsConfig,
        settings: EvaluationSettings,
        resolver: RealDataResolver,
        sample_io: SampleIo,
        evaluator: MetricsEvaluator,
    ) -> Self {
        Self {
            paths,
            settings,
            resolver,
            sample_io,
            evaluator,
            overwrite: false,
            real_cache: HashMap::new(),
        }
    }

    /// Re-download generated samples even when present on disk
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Load the selected submissions.
    ///
    /// With [`SubmissionSelector::All`] a submission that fails to load is
    /// recorded and skipped, as is a directory declaring a name already taken
    /// by an earlier one. A single named submission that fails to load is an
    /// error.
    #[instrument(skip(self))]
    pub fn load_submissions(&self, selector: &SubmissionSelector) -> EvalResult<LoadOutcome> {
        let layout = self.settings.efp_cache_layout;
        let mut outcome = LoadOutcome::default();

        match selector {
            SubmissionSelector::Named(name) => {
                outcome.submissions.push(load_submission(
                    &self.paths.submission_dir,
                    name,
                    &self.paths.gen_datasets_dir,
                    layout,
                )?);
            }
            SubmissionSelector::All => {
                let mut declared: HashMap<String, String> = HashMap::new();

                for name in discover_submissions(&self.paths.submission_dir)? {
                    let loaded = load_submission(
                        &self.paths.submission_dir,
                        &name,
                        &self.paths.gen_datasets_dir,
                        layout,
                    )
                    .and_then(|submission| match declared.entry(submission.name().to_string()) {
                        Entry::Occupied(first) => Err(EvalError::from(
                            ConfigurationError::DuplicateSubmission {
                                name: first.key().clone(),
                                first: first.get().clone(),
                            },
                        )),
                        Entry::Vacant(slot) => {
                            slot.insert(name.clone());
                            Ok(submission)
                        }
                    });

                    match loaded {
                        Ok(submission) => outcome.submissions.push(submission),
                        Err(e) => {
                            warn!(submission = %name, error = %e, "Skipping submission");
                            outcome.failures.push(LoadFailure::from_error(&name, &e));
                        }
                    }
                }
            }
        }

        info!(
            loaded = outcome.submissions.len(),
            failed = outcome.failures.len(),
            "Loaded submissions"
        );
        Ok(outcome)
    }

    /// Load and evaluate the selected submissions
    pub async fn run(&mut self, selector: &SubmissionSelector) -> EvalResult<EvaluationReport> {
        let LoadOutcome {
            mut submissions,
            failures,
        } = self.load_submissions(selector)?;

        let mut report = EvaluationReport::new();
        report.load_failures = failures;
        self.evaluate_all(&mut submissions, &mut report).await;
        Ok(report)
    }

    /// Evaluate every submission into `report`
    pub async fn evaluate_all(&mut self, submissions: &mut [Submission], report: &mut EvaluationReport) {
        for submission in submissions.iter_mut() {
            let result = self.evaluate_submission(submission).await;
            report
                .submissions
                .insert(submission.name().to_string(), result);
        }

        info!(
            scored = report.scored_count(),
            failed = report.failure_count(),
            "Evaluation finished"
        );
    }

    /// Evaluate each declared pair of one submission
    #[instrument(skip(self, submission), fields(submission = %submission.name()))]
    pub async fn evaluate_submission(&mut self, submission: &mut Submission) -> SubmissionReport {
        let mut report = SubmissionReport::default();

        for (dataset, classes) in submission.samples_mut() {
            for (data_class, gen) in classes.iter_mut() {
                match self.evaluate_pair(gen).await {
                    Ok(scores) => {
                        info!(
                            dataset = %dataset,
                            data_class = %data_class,
                            w1m = scores.w1m.0,
                            w1p = scores.w1p.0,
                            fpd = scores.fpd,
                            kpd = scores.kpd,
                            "Scored"
                        );
                        report.record(dataset, data_class, scores);
                    }
                    Err(e) => {
                        error!(
                            dataset = %dataset,
                            data_class = %data_class,
                            code = e.error_code(),
                            error = %e,
                            "Evaluation failed"
                        );
                        report.record_failure(dataset, data_class, &e);
                    }
                }
            }
        }

        report
    }

    async fn evaluate_pair(&mut self, gen: &mut SampleSet) -> EvalResult<Scores> {
        let dataset = gen.dataset().to_string();
        let data_class = gen.data_class().to_string();
        let data_dir = self.paths.real_datasets_dir.clone();
        let num_samples = self.settings.num_samples;

        if !self.settings.cache_real_samples {
            let mut real = self
                .resolver
                .get_real_samples(&dataset, &data_class, &data_dir, num_samples)
                .await?;
            gen.download(&self.sample_io, self.overwrite).await?;
            return self.evaluator.evaluate(&mut real, gen);
        }

        let real = match self.real_cache.entry((dataset, data_class)) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let (dataset, data_class) = entry.key();
                let real = self
                    .resolver
                    .get_real_samples(dataset, data_class, &data_dir, num_samples)
                    .await?;
                entry.insert(real)
            }
        };

        gen.download(&self.sample_io, self.overwrite).await?;
        self.evaluator.evaluate(real, gen)
    }
}
