//! Energy flow polynomials of degree at most 3.
//!
//! All connected multigraphs with up to three edges, hadronic measure with
//! beta = 1: z_i = pt_i / sum(pt), theta_ij = sqrt(deta^2 + dphi^2).
//!
//! With a_n(i) = sum_j z_j theta_ij^n the graphs reduce to:
//!
//! | idx | graph                      | value                                  |
//! |-----|----------------------------|----------------------------------------|
//! | 0   | single edge                | sum_i z_i a1(i)                        |
//! | 1   | double edge                | sum_i z_i a2(i)                        |
//! | 2   | 2-edge path                | sum_i z_i a1(i)^2                      |
//! | 3   | triple edge                | sum_i z_i a3(i)                        |
//! | 4   | double edge + edge         | sum_i z_i a2(i) a1(i)                  |
//! | 5   | 3-star                     | sum_i z_i a1(i)^3                      |
//! | 6   | 3-edge path                | sum_ik z_i z_k theta_ik a1(i) a1(k)    |
//! | 7   | triangle                   | sum_ijk z_i z_j z_k theta_ij theta_jk theta_ik |

use jetsim_domain::{EvalError, EvalResult};
use ndarray::{Array2, ArrayView2, ArrayView3, Axis};

/// Number of polynomials per jet
pub const NUM_EFPS: usize = 8;

const ETA: usize = 0;
const PHI: usize = 1;
const PT: usize = 2;

/// EFPs of every jet in `(num_jets, num_particles, num_features)` samples
pub fn energy_flow_polynomials(samples: ArrayView3<f32>) -> EvalResult<Array2<f64>> {
    let num_features = samples.len_of(Axis(2));
    if num_features <= PT {
        return Err(EvalError::metric(format!(
            "EFPs need (etarel, phirel, ptrel) features, got {num_features} columns"
        )));
    }

    let mut out = Array2::zeros((samples.len_of(Axis(0)), NUM_EFPS));
    for (jet, mut row) in samples.outer_iter().zip(out.outer_iter_mut()) {
        let values = jet_efps(jet);
        for (dst, src) in row.iter_mut().zip(values) {
            *dst = src;
        }
    }
    Ok(out)
}

fn jet_efps(jet: ArrayView2<f32>) -> [f64; NUM_EFPS] {
    // zero-pt particles carry no energy; dropping them also skips padding
    let particles: Vec<(f64, f64, f64)> = jet
        .outer_iter()
        .map(|p| (p[ETA] as f64, p[PHI] as f64, p[PT] as f64))
        .filter(|&(_, _, pt)| pt > 0.0)
        .collect();

    let pt_sum: f64 = particles.iter().map(|p| p.2).sum();
    if particles.is_empty() || pt_sum <= 0.0 {
        return [0.0; NUM_EFPS];
    }

    let m = particles.len();
    let z: Vec<f64> = particles.iter().map(|p| p.2 / pt_sum).collect();

    let mut theta = vec![0.0; m * m];
    for i in 0..m {
        for j in (i + 1)..m {
            let d_eta = particles[i].0 - particles[j].0;
            let d_phi = particles[i].1 - particles[j].1;
            let t = (d_eta * d_eta + d_phi * d_phi).sqrt();
            theta[i * m + j] = t;
            theta[j * m + i] = t;
        }
    }

    let mut a1 = vec![0.0; m];
    let mut a2 = vec![0.0; m];
    let mut a3 = vec![0.0; m];
    for i in 0..m {
        for j in 0..m {
            let t = theta[i * m + j];
            a1[i] += z[j] * t;
            a2[i] += z[j] * t * t;
            a3[i] += z[j] * t * t * t;
        }
    }

    let mut efps = [0.0; NUM_EFPS];
    for i in 0..m {
        efps[0] += z[i] * a1[i];
        efps[1] += z[i] * a2[i];
        efps[2] += z[i] * a1[i] * a1[i];
        efps[3] += z[i] * a3[i];
        efps[4] += z[i] * a2[i] * a1[i];
        efps[5] += z[i] * a1[i] * a1[i] * a1[i];
        for k in 0..m {
            efps[6] += z[i] * z[k] * theta[i * m + k] * a1[i] * a1[k];
        }
    }

    // ordered triples with repeated indices vanish, the rest come in 3! orders
    let mut triangle = 0.0;
    for i in 0..m {
        for j in (i + 1)..m {
            let zij = z[i] * z[j] * theta[i * m + j];
            for k in (j + 1)..m {
                triangle += zij * z[k] * theta[j * m + k] * theta[i * m + k];
            }
        }
    }
    efps[7] = 6.0 * triangle;

    efps
}
