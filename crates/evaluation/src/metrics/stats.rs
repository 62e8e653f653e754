//! Small statistics helpers.

use nalgebra::{DMatrix, SymmetricEigen};

/// Wasserstein-1 distance between two 1-D empirical distributions.
///
/// Integral of the absolute difference of the two empirical CDFs. `None` when
/// either side is empty.
pub fn wasserstein_1d(u: &[f64], v: &[f64]) -> Option<f64> {
    if u.is_empty() || v.is_empty() {
        return None;
    }

    let mut u = u.to_vec();
    let mut v = v.to_vec();
    u.sort_by(f64::total_cmp);
    v.sort_by(f64::total_cmp);

    let mut all: Vec<f64> = u.iter().chain(v.iter()).copied().collect();
    all.sort_by(f64::total_cmp);

    let (nu, nv) = (u.len() as f64, v.len() as f64);
    let (mut i, mut j) = (0, 0);
    let mut total = 0.0;

    for w in all.windows(2) {
        while i < u.len() && u[i] <= w[0] {
            i += 1;
        }
        while j < v.len() && v[j] <= w[0] {
            j += 1;
        }
        total += (i as f64 / nu - j as f64 / nv).abs() * (w[1] - w[0]);
    }

    Some(total)
}

/// Mean and population standard deviation
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Median of a non-empty slice
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n == 0 {
        f64::NAN
    } else if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Square root of a symmetric positive semi-definite matrix.
///
/// Negative eigenvalues from round-off are clamped to zero.
pub fn psd_sqrt(m: &DMatrix<f64>) -> DMatrix<f64> {
    let eigen = SymmetricEigen::new(m.clone());
    let sqrt_vals = eigen.eigenvalues.map(|l| l.max(0.0).sqrt());
    &eigen.eigenvectors * DMatrix::from_diagonal(&sqrt_vals) * eigen.eigenvectors.transpose()
}

/// Trace of the square root of a symmetric PSD matrix
pub fn trace_sqrt(m: &DMatrix<f64>) -> f64 {
    SymmetricEigen::new(m.clone())
        .eigenvalues
        .iter()
        .map(|l| l.max(0.0).sqrt())
        .sum()
}
