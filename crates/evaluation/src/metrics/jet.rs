//! Reference metrics for jets in relative coordinates.

use super::efp::energy_flow_polynomials;
use super::stats::{mean_std, median, psd_sqrt, trace_sqrt, wasserstein_1d};
use super::{MetricsProvider, W1Options};
use jetsim_domain::{EvalError, EvalResult, MetricValue};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array2, ArrayView2, ArrayView3, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Kinematic features compared by `w1_particle`: etarel, phirel, ptrel
const KINEMATIC_FEATURES: usize = 3;

/// Metrics over `(etarel, phirel, ptrel[, mask])` particle features.
///
/// Every call reseeds its own generator, so results are reproducible for a
/// given seed regardless of call order.
#[derive(Debug, Clone)]
pub struct JetMetrics {
    seed: u64,
    kpd_batch_size: usize,
    kpd_num_batches: usize,
}

impl Default for JetMetrics {
    fn default() -> Self {
        Self {
            seed: 42,
            kpd_batch_size: 5_000,
            kpd_num_batches: 10,
        }
    }
}

impl JetMetrics {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn with_kpd_batches(mut self, batch_size: usize, num_batches: usize) -> Self {
        self.kpd_batch_size = batch_size;
        self.kpd_num_batches = num_batches;
        self
    }

    fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }
}

impl MetricsProvider for JetMetrics {
    fn w1_mass(
        &self,
        real: ArrayView3<f32>,
        gen: ArrayView3<f32>,
        options: &W1Options,
    ) -> EvalResult<MetricValue> {
        check_kinematics(&real)?;
        check_kinematics(&gen)?;
        let real_mass = jet_masses(&real);
        let gen_mass = jet_masses(&gen);

        let mut rng = self.rng();
        let mut batches = Vec::with_capacity(options.num_batches);
        for _ in 0..options.num_batches {
            let r = bootstrap(&real_mass, options.num_eval_samples, &mut rng);
            let g = bootstrap(&gen_mass, options.num_eval_samples, &mut rng);
            let w1 = wasserstein_1d(&r, &g)
                .ok_or_else(|| EvalError::metric("w1m needs at least one jet on each side"))?;
            batches.push(w1);
        }

        debug!(?batches, "w1m batches");
        Ok(summarize(&batches, options.return_std))
    }

    fn w1_particle(
        &self,
        real: ArrayView3<f32>,
        gen: ArrayView3<f32>,
        exclude_zero_padding: bool,
        options: &W1Options,
    ) -> EvalResult<MetricValue> {
        check_kinematics(&real)?;
        check_kinematics(&gen)?;
        let (num_real, num_gen) = (real.len_of(Axis(0)), gen.len_of(Axis(0)));
        if num_real == 0 || num_gen == 0 {
            return Err(EvalError::metric("w1p needs at least one jet on each side"));
        }

        let mut rng = self.rng();
        let mut batches = Vec::with_capacity(options.num_batches);
        for _ in 0..options.num_batches {
            let real_idx = sample_indices(num_real, options.num_eval_samples, &mut rng);
            let gen_idx = sample_indices(num_gen, options.num_eval_samples, &mut rng);
            let r = particle_columns(&real, &real_idx, exclude_zero_padding);
            let g = particle_columns(&gen, &gen_idx, exclude_zero_padding);

            let mut per_feature = Vec::with_capacity(KINEMATIC_FEATURES);
            for (rc, gc) in r.iter().zip(&g) {
                let w1 = wasserstein_1d(rc, gc)
                    .ok_or_else(|| EvalError::metric("w1p batch has no non-padding particles"))?;
                per_feature.push(w1);
            }
            batches.push(per_feature.iter().sum::<f64>() / per_feature.len() as f64);
        }

        debug!(?batches, "w1p batches");
        Ok(summarize(&batches, options.return_std))
    }

    fn energy_flow_polynomials(&self, samples: ArrayView3<f32>) -> EvalResult<Array2<f64>> {
        energy_flow_polynomials(samples)
    }

    fn frechet_distance(&self, real: ArrayView2<f64>, gen: ArrayView2<f64>) -> EvalResult<f64> {
        check_features(&real, &gen, 2, "fpd")?;
        let scale = max_abs_scale(&real);
        let real = to_matrix(&real, &scale);
        let gen = to_matrix(&gen, &scale);

        let (mu_r, sigma_r) = mean_cov(&real);
        let (mu_g, sigma_g) = mean_cov(&gen);

        let diff = (&mu_r - &mu_g).norm_squared();
        let sqrt_r = psd_sqrt(&sigma_r);
        let covmean = trace_sqrt(&(&sqrt_r * &sigma_g * &sqrt_r));
        let fpd = diff + sigma_r.trace() + sigma_g.trace() - 2.0 * covmean;

        Ok(fpd.max(0.0))
    }

    fn kernel_distance(&self, real: ArrayView2<f64>, gen: ArrayView2<f64>) -> EvalResult<f64> {
        check_features(&real, &gen, 1, "kpd")?;
        if self.kpd_batch_size < 2 || self.kpd_num_batches == 0 {
            return Err(EvalError::metric("kpd needs batches of at least two jets"));
        }

        let scale = max_abs_scale(&real);
        let real = to_matrix(&real, &scale);
        let gen = to_matrix(&gen, &scale);

        let mut rng = self.rng();
        let mut batches = Vec::with_capacity(self.kpd_num_batches);
        for _ in 0..self.kpd_num_batches {
            let r = sample_indices(real.nrows(), self.kpd_batch_size, &mut rng);
            let g = sample_indices(gen.nrows(), self.kpd_batch_size, &mut rng);
            batches.push(mmd_cubic(&real, &r, &gen, &g));
        }

        debug!(?batches, "kpd batches");
        Ok(median(&batches))
    }
}

fn summarize(batches: &[f64], return_std: bool) -> MetricValue {
    let (mean, std) = mean_std(batches);
    if return_std {
        MetricValue::MeanStd(mean, std)
    } else {
        MetricValue::Scalar(mean)
    }
}

fn check_kinematics(samples: &ArrayView3<f32>) -> EvalResult<()> {
    let num_features = samples.len_of(Axis(2));
    if num_features < KINEMATIC_FEATURES {
        return Err(EvalError::metric(format!(
            "expected (etarel, phirel, ptrel) particle features, got {num_features} columns"
        )));
    }
    Ok(())
}

fn check_features(
    real: &ArrayView2<f64>,
    gen: &ArrayView2<f64>,
    min_rows: usize,
    metric: &str,
) -> EvalResult<()> {
    if real.ncols() != gen.ncols() {
        return Err(EvalError::metric(format!(
            "{metric}: feature counts differ ({} vs {})",
            real.ncols(),
            gen.ncols()
        )));
    }
    if real.nrows() < min_rows || gen.nrows() < min_rows {
        return Err(EvalError::metric(format!(
            "{metric}: need at least {min_rows} jets on each side"
        )));
    }
    Ok(())
}

/// Invariant mass of each jet, particles treated as massless
fn jet_masses(samples: &ArrayView3<f32>) -> Vec<f64> {
    samples
        .outer_iter()
        .map(|jet| {
            let (mut e, mut px, mut py, mut pz) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
            for p in jet.outer_iter() {
                let (eta, phi, pt) = (p[0] as f64, p[1] as f64, p[2] as f64);
                px += pt * phi.cos();
                py += pt * phi.sin();
                pz += pt * eta.sinh();
                e += pt * eta.cosh();
            }
            (e * e - px * px - py * py - pz * pz).max(0.0).sqrt()
        })
        .collect()
}

fn sample_indices(n: usize, size: usize, rng: &mut ChaCha8Rng) -> Vec<usize> {
    (0..size).map(|_| rng.gen_range(0..n)).collect()
}

fn bootstrap(values: &[f64], size: usize, rng: &mut ChaCha8Rng) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    sample_indices(values.len(), size, rng)
        .into_iter()
        .map(|i| values[i])
        .collect()
}

/// Kinematic feature values of the selected jets, one vector per feature
fn particle_columns(
    samples: &ArrayView3<f32>,
    jets: &[usize],
    exclude_zero_padding: bool,
) -> Vec<Vec<f64>> {
    let mut columns = vec![Vec::new(); KINEMATIC_FEATURES];
    for &j in jets {
        for p in samples.index_axis(Axis(0), j).outer_iter() {
            let kin = p.slice(ndarray::s![..KINEMATIC_FEATURES]);
            if exclude_zero_padding && kin.iter().all(|v| *v == 0.0) {
                continue;
            }
            for (col, v) in columns.iter_mut().zip(kin.iter()) {
                col.push(*v as f64);
            }
        }
    }
    columns
}

/// Per-column max-abs of the real features, zero columns left unscaled
fn max_abs_scale(real: &ArrayView2<f64>) -> Vec<f64> {
    real.axis_iter(Axis(1))
        .map(|col| {
            let m = col.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
            if m > 0.0 {
                m
            } else {
                1.0
            }
        })
        .collect()
}

fn to_matrix(features: &ArrayView2<f64>, scale: &[f64]) -> DMatrix<f64> {
    DMatrix::from_fn(features.nrows(), features.ncols(), |i, j| {
        features[[i, j]] / scale[j]
    })
}

/// Column means and sample covariance (n - 1 denominator)
fn mean_cov(x: &DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
    let n = x.nrows() as f64;
    let mean = DVector::from_fn(x.ncols(), |j, _| x.column(j).sum() / n);
    let mean_row = mean.transpose();
    let mut centered = x.clone();
    for mut row in centered.row_iter_mut() {
        row -= &mean_row;
    }
    let cov = centered.transpose() * &centered / (n - 1.0);
    (mean, cov)
}

/// Unbiased MMD^2 with the cubic polynomial kernel (x.y / d + 1)^3
fn mmd_cubic(x: &DMatrix<f64>, xi: &[usize], y: &DMatrix<f64>, yi: &[usize]) -> f64 {
    let d = x.ncols() as f64;
    let kernel = |a: &DMatrix<f64>, i: usize, b: &DMatrix<f64>, j: usize| {
        let dot = a.row(i).dot(&b.row(j));
        (dot / d + 1.0).powi(3)
    };

    let m = xi.len() as f64;
    let (mut kxx, mut kyy, mut kxy) = (0.0, 0.0, 0.0);
    for (a, &i) in xi.iter().enumerate() {
        for (b, &j) in xi.iter().enumerate() {
            if a != b {
                kxx += kernel(x, i, x, j);
            }
        }
    }
    for (a, &i) in yi.iter().enumerate() {
        for (b, &j) in yi.iter().enumerate() {
            if a != b {
                kyy += kernel(y, i, y, j);
            }
        }
    }
    for &i in xi {
        for &j in yi {
            kxy += kernel(x, i, y, j);
        }
    }

    (kxx + kyy) / (m * (m - 1.0)) - 2.0 * kxy / (m * m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};
    use rand::{Rng, SeedableRng};

    fn random_jets(n: usize, seed: u64, shift: f32) -> Array3<f32> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Array3::from_shape_fn((n, 10, 3), |(_, _, f)| match f {
            2 => rng.gen_range(0.01..0.2) + shift,
            _ => rng.gen_range(-0.4..0.4),
        })
    }

    fn options() -> W1Options {
        W1Options {
            num_batches: 3,
            num_eval_samples: 200,
            return_std: true,
        }
    }

    #[test]
    fn test_back_to_back_mass() {
        // two unit-pt particles at eta = 0 opposite in phi: m = 2
        let mut jet = Array3::<f32>::zeros((1, 2, 3));
        jet[[0, 0, 2]] = 1.0;
        jet[[0, 1, 1]] = std::f32::consts::PI;
        jet[[0, 1, 2]] = 1.0;
        let masses = jet_masses(&jet.view());
        assert!((masses[0] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_w1m_identical_samples() {
        let jets = random_jets(300, 1, 0.0);
        let metrics = JetMetrics::new(7);
        let value = metrics.w1_mass(jets.view(), jets.view(), &options()).unwrap();
        let (mean, std) = value.as_pair();
        assert!(mean >= 0.0);
        assert!(std >= 0.0);
        assert!(matches!(value, MetricValue::MeanStd(..)));
    }

    #[test]
    fn test_w1p_detects_shift() {
        let real = random_jets(300, 1, 0.0);
        let gen = random_jets(300, 2, 0.5);
        let metrics = JetMetrics::new(7);

        let same = metrics
            .w1_particle(real.view(), random_jets(300, 3, 0.0).view(), true, &options())
            .unwrap();
        let shifted = metrics
            .w1_particle(real.view(), gen.view(), true, &options())
            .unwrap();
        assert!(shifted.value() > same.value());
    }

    #[test]
    fn test_w1_is_reproducible() {
        let real = random_jets(100, 1, 0.0);
        let gen = random_jets(100, 2, 0.0);
        let metrics = JetMetrics::new(3);
        let a = metrics.w1_mass(real.view(), gen.view(), &options()).unwrap();
        let b = metrics.w1_mass(real.view(), gen.view(), &options()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_w1p_scalar_without_std() {
        let jets = random_jets(50, 1, 0.0);
        let opts = W1Options {
            return_std: false,
            ..options()
        };
        let value = JetMetrics::default()
            .w1_particle(jets.view(), jets.view(), true, &opts)
            .unwrap();
        assert!(matches!(value, MetricValue::Scalar(_)));
    }

    #[test]
    fn test_w1p_all_padding_fails() {
        let jets = Array3::<f32>::zeros((5, 4, 3));
        let result = JetMetrics::default().w1_particle(jets.view(), jets.view(), true, &options());
        assert!(result.is_err());
    }

    #[test]
    fn test_fpd_identical_is_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let efps = Array2::from_shape_fn((500, 4), |_| rng.gen_range(0.0..1.0));
        let fpd = JetMetrics::default()
            .frechet_distance(efps.view(), efps.view())
            .unwrap();
        assert!(fpd.abs() < 1e-6, "fpd = {fpd}");
    }

    #[test]
    fn test_fpd_grows_with_shift() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let real = Array2::from_shape_fn((500, 4), |_| rng.gen_range(0.0..1.0));
        let near = &real + 0.05;
        let far = &real + 0.5;
        let metrics = JetMetrics::default();
        let d_near = metrics.frechet_distance(real.view(), near.view()).unwrap();
        let d_far = metrics.frechet_distance(real.view(), far.view()).unwrap();
        assert!(d_far > d_near);
    }

    #[test]
    fn test_kpd_separates_distributions() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let real = Array2::from_shape_fn((400, 3), |_| rng.gen_range(0.0..1.0));
        let other = Array2::from_shape_fn((400, 3), |_| rng.gen_range(0.0..1.0));
        let far = Array2::from_shape_fn((400, 3), |_| rng.gen_range(2.0..3.0));

        let metrics = JetMetrics::new(1).with_kpd_batches(100, 5);
        let d_same = metrics.kernel_distance(real.view(), other.view()).unwrap();
        let d_far = metrics.kernel_distance(real.view(), far.view()).unwrap();
        assert!(d_far > d_same);
        assert!(d_same.abs() < 0.5);
    }

    #[test]
    fn test_feature_mismatch_rejected() {
        let a = Array2::<f64>::zeros((10, 3));
        let b = Array2::<f64>::zeros((10, 4));
        assert!(JetMetrics::default().frechet_distance(a.view(), b.view()).is_err());
    }
}
