//! Mock implementations of the evaluation ports and metrics.
//!
//! Every mock records how it was called so tests can assert on network
//! activity and on how often expensive work ran.

use async_trait::async_trait;
use jetsim_domain::{EvalResult, MetricValue, StorageError, TransportError};
use jetsim_evaluation::metrics::{MetricsProvider, W1Options};
use jetsim_evaluation::ports::{DatasetProvider, FetchRequest, Transfer};
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

/// Mock transfer that either serves fixed bytes or fails every request
pub struct MockTransfer {
    payload: Option<Vec<u8>>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl MockTransfer {
    /// Writes `payload` to the destination of every download
    pub fn serving(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: Some(payload.into()),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Fails every download with a 503
    pub fn failing() -> Self {
        Self {
            payload: None,
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.read().len()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.read().clone()
    }
}

impl Default for MockTransfer {
    fn default() -> Self {
        Self::failing()
    }
}

#[async_trait]
impl Transfer for MockTransfer {
    async fn download(&self, url: &Url, dest: &Path) -> EvalResult<u64> {
        self.requests.write().push(url.to_string());

        match &self.payload {
            Some(payload) => {
                std::fs::write(dest, payload).map_err(|e| StorageError::io(dest, e))?;
                Ok(payload.len() as u64)
            }
            None => Err(TransportError::Status {
                url: url.to_string(),
                status: 503,
            }
            .into()),
        }
    }
}

/// Mock reference dataset provider.
///
/// Jet `i` of the returned array has every entry equal to `i`, so tests can
/// tell which rows were kept.
pub struct MockDatasetProvider {
    shape: (usize, usize, usize),
    failing_jet_types: HashSet<String>,
    requests: Arc<RwLock<Vec<FetchRequest>>>,
}

impl MockDatasetProvider {
    /// Indexed rows of the given shape
    pub fn indexed(num_jets: usize, num_particles: usize, num_features: usize) -> Self {
        Self {
            shape: (num_jets, num_particles, num_features),
            failing_jet_types: HashSet::new(),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Fail requests for `jet_type` with a transport error
    pub fn failing_for(mut self, jet_type: impl Into<String>) -> Self {
        self.failing_jet_types.insert(jet_type.into());
        self
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.read().len()
    }
}

#[async_trait]
impl DatasetProvider for MockDatasetProvider {
    async fn fetch_or_load(&self, request: &FetchRequest) -> EvalResult<Array3<f32>> {
        self.requests.write().push(request.clone());

        if self.failing_jet_types.contains(&request.jet_type) {
            return Err(TransportError::Request {
                url: format!("mock://{}/{}", request.dataset, request.jet_type),
                message: "connection refused".to_string(),
            }
            .into());
        }

        let mut samples = Array3::zeros(self.shape);
        for (i, mut jet) in samples.axis_iter_mut(Axis(0)).enumerate() {
            jet.fill(i as f32);
        }
        Ok(samples)
    }
}

/// Mock metrics returning fixed values
///
/// EFPs are one column per particle feature holding the sum over the jet, so
/// their row count always follows the samples.
pub struct MockMetricsProvider {
    efp_calls: AtomicUsize,
    w1_calls: AtomicUsize,
}

impl MockMetricsProvider {
    pub const W1: (f64, f64) = (0.1, 0.01);
    pub const FPD: f64 = 0.5;
    pub const KPD: f64 = 0.25;

    pub fn new() -> Self {
        Self {
            efp_calls: AtomicUsize::new(0),
            w1_calls: AtomicUsize::new(0),
        }
    }

    pub fn efp_calls(&self) -> usize {
        self.efp_calls.load(Ordering::SeqCst)
    }

    pub fn w1_calls(&self) -> usize {
        self.w1_calls.load(Ordering::SeqCst)
    }

    fn w1(&self, options: &W1Options) -> MetricValue {
        self.w1_calls.fetch_add(1, Ordering::SeqCst);
        if options.return_std {
            MetricValue::MeanStd(Self::W1.0, Self::W1.1)
        } else {
            MetricValue::Scalar(Self::W1.0)
        }
    }
}

impl Default for MockMetricsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for MockMetricsProvider {
    fn w1_mass(
        &self,
        _real: ArrayView3<f32>,
        _gen: ArrayView3<f32>,
        options: &W1Options,
    ) -> EvalResult<MetricValue> {
        Ok(self.w1(options))
    }

    fn w1_particle(
        &self,
        _real: ArrayView3<f32>,
        _gen: ArrayView3<f32>,
        _exclude_zero_padding: bool,
        options: &W1Options,
    ) -> EvalResult<MetricValue> {
        Ok(self.w1(options))
    }

    fn energy_flow_polynomials(&self, samples: ArrayView3<f32>) -> EvalResult<Array2<f64>> {
        self.efp_calls.fetch_add(1, Ordering::SeqCst);
        let (num_jets, _, num_features) = samples.dim();
        Ok(Array2::from_shape_fn((num_jets, num_features), |(j, f)| {
            samples
                .index_axis(Axis(0), j)
                .column(f)
                .iter()
                .map(|v| *v as f64)
                .sum::<f64>()
        }))
    }

    fn frechet_distance(&self, _real: ArrayView2<f64>, _gen: ArrayView2<f64>) -> EvalResult<f64> {
        Ok(Self::FPD)
    }

    fn kernel_distance(&self, _real: ArrayView2<f64>, _gen: ArrayView2<f64>) -> EvalResult<f64> {
        Ok(Self::KPD)
    }
}
