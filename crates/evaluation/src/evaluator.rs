//! The fixed metric battery.

use crate::metrics::{MetricsProvider, W1Options};
use crate::samples::SampleSet;
use jetsim_domain::{EvalResult, PreconditionError, Scores};
use ndarray::Array3;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Computes `w1m`, `w1p`, `fpd` and `kpd` for a real/generated pair
#[derive(Clone)]
pub struct MetricsEvaluator {
    metrics: Arc<dyn MetricsProvider>,
    num_w1_eval_samples: usize,
    num_w1_batches: usize,
}

impl MetricsEvaluator {
    pub fn new(metrics: Arc<dyn MetricsProvider>) -> Self {
        Self {
            metrics,
            num_w1_eval_samples: 50_000,
            num_w1_batches: 5,
        }
    }

    pub fn with_w1_batches(mut self, num_w1_eval_samples: usize, num_w1_batches: usize) -> Self {
        self.num_w1_eval_samples = num_w1_eval_samples;
        self.num_w1_batches = num_w1_batches;
        self
    }

    /// Score `gen` against `real`.
    ///
    /// Both sets must have samples loaded. EFPs are computed (and cached) on
    /// both sides if they are not available yet.
    #[instrument(
        skip(self, real, gen),
        fields(dataset = %gen.dataset(), data_class = %gen.data_class())
    )]
    pub fn evaluate(&self, real: &mut SampleSet, gen: &mut SampleSet) -> EvalResult<Scores> {
        let options = W1Options {
            num_batches: self.num_w1_batches,
            num_eval_samples: self.num_w1_eval_samples,
            return_std: true,
        };

        let (w1m, w1p) = {
            let real_samples = loaded(real)?;
            let gen_samples = loaded(gen)?;
            let w1m = self
                .metrics
                .w1_mass(real_samples.view(), gen_samples.view(), &options)?;
            let w1p = self
                .metrics
                .w1_particle(real_samples.view(), gen_samples.view(), true, &options)?;
            (w1m, w1p)
        };
        debug!(%w1m, %w1p, "W1 metrics");

        let real_efps = real.get_efps(self.metrics.as_ref())?;
        let gen_efps = gen.get_efps(self.metrics.as_ref())?;
        let fpd = self
            .metrics
            .frechet_distance(real_efps.view(), gen_efps.view())?;
        let kpd = self
            .metrics
            .kernel_distance(real_efps.view(), gen_efps.view())?;
        debug!(fpd, kpd, "EFP metrics");

        Ok(Scores {
            w1m: w1m.as_pair(),
            w1p: w1p.as_pair(),
            fpd,
            kpd,
        })
    }
}

fn loaded(set: &SampleSet) -> EvalResult<&Array3<f32>> {
    set.samples().ok_or_else(|| {
        PreconditionError::SamplesNotLoaded {
            dataset: set.dataset().to_string(),
            data_class: set.data_class().to_string(),
        }
        .into()
    })
}
