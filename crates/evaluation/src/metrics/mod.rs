//! Metric battery contract and the reference jet metrics.
//!
//! The pipeline only talks to [`MetricsProvider`]. [`JetMetrics`] implements
//! it for jets given as relative `(etarel, phirel, ptrel[, mask])` particle
//! features.

mod efp;
mod jet;
pub mod stats;

pub use efp::{energy_flow_polynomials, NUM_EFPS};
pub use jet::JetMetrics;

use jetsim_domain::{EvalResult, MetricValue};
use ndarray::{Array2, ArrayView2, ArrayView3};

/// Batching parameters for the W1 metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct W1Options {
    pub num_batches: usize,
    /// Jets drawn from each side per batch
    pub num_eval_samples: usize,
    /// Return `(mean, std)` instead of the mean alone
    pub return_std: bool,
}

impl Default for W1Options {
    fn default() -> Self {
        Self {
            num_batches: 5,
            num_eval_samples: 50_000,
            return_std: true,
        }
    }
}

/// Distances between real and generated jet samples
pub trait MetricsProvider: Send + Sync {
    /// W1 distance between jet mass distributions
    fn w1_mass(
        &self,
        real: ArrayView3<f32>,
        gen: ArrayView3<f32>,
        options: &W1Options,
    ) -> EvalResult<MetricValue>;

    /// W1 distance between particle feature distributions
    fn w1_particle(
        &self,
        real: ArrayView3<f32>,
        gen: ArrayView3<f32>,
        exclude_zero_padding: bool,
        options: &W1Options,
    ) -> EvalResult<MetricValue>;

    /// Energy flow polynomials, one row per jet
    fn energy_flow_polynomials(&self, samples: ArrayView3<f32>) -> EvalResult<Array2<f64>>;

    /// Frechet distance between two EFP distributions
    fn frechet_distance(&self, real: ArrayView2<f64>, gen: ArrayView2<f64>) -> EvalResult<f64>;

    /// Kernel distance between two EFP distributions
    fn kernel_distance(&self, real: ArrayView2<f64>, gen: ArrayView2<f64>) -> EvalResult<f64>;
}
