//! Test fixtures for jet samples and submission directories.
//!
//! Samples follow the JetNet particle layout: `[etarel, phirel, ptrel, mask]`
//! per particle, with zero-padded trailing particles.

use indexmap::IndexMap;
use jetsim_common::ChecksumVerifier;
use jetsim_domain::{SampleSource, SubmissionMetadata};
use ndarray::Array3;
use ndarray_npy::write_npy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Number of per-particle features in generated samples
pub const NUM_FEATURES: usize = 4;

/// Random jets of shape `(num_jets, num_particles, 4)`.
///
/// Every jet has at least one real particle; the remaining slots past a random
/// cut-off are zero padded with a mask of 0.
pub fn jet_samples(num_jets: usize, num_particles: usize, seed: u64) -> Array3<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut samples = Array3::zeros((num_jets, num_particles, NUM_FEATURES));

    for mut jet in samples.outer_iter_mut() {
        let real = if num_particles == 0 {
            0
        } else {
            rng.gen_range(1..=num_particles)
        };

        for p in 0..real {
            jet[[p, 0]] = rng.gen_range(-0.4..0.4);
            jet[[p, 1]] = rng.gen_range(-0.4..0.4);
            jet[[p, 2]] = rng.gen_range(0.001..0.3);
            jet[[p, 3]] = 1.0;
        }
    }

    samples
}

/// Writes `samples` as `.npy`, creating the parent directory
pub fn write_samples_npy(path: &Path, samples: &Array3<f32>) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    write_npy(path, samples).unwrap();
    path.to_path_buf()
}

/// Writes `<submission_dir>/<name>/metadata.yml` with the given content
pub fn write_metadata(submission_dir: &Path, name: &str, yaml: &str) -> PathBuf {
    let dir = submission_dir.join(name);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("metadata.yml");
    fs::write(&path, yaml).unwrap();
    path
}

/// Hex MD5 digest of a file
pub fn file_md5(path: &Path) -> String {
    ChecksumVerifier::Md5.compute_file(path).unwrap()
}

/// Metadata declaring a single `jetnet/g30` sample
pub fn create_test_metadata() -> SubmissionMetadata {
    let mut classes = IndexMap::new();
    classes.insert(
        "g30".to_string(),
        SampleSource {
            url: Url::parse("https://example.org/mp-gan/g30.npy").unwrap(),
            md5: None,
            sha256: None,
        },
    );

    let mut gen_samples = IndexMap::new();
    gen_samples.insert("jetnet".to_string(), classes);

    SubmissionMetadata {
        name: "mp-gan".to_string(),
        authors: vec!["Test Author".to_string()],
        affiliations: vec!["Test University".to_string()],
        gen_samples,
        container_path: None,
        inference_command: None,
        model_repository: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_jet_samples_are_padded() {
        let samples = jet_samples(50, 30, 1);
        assert_eq!(samples.shape(), &[50, 30, NUM_FEATURES]);

        for jet in samples.outer_iter() {
            assert_eq!(jet[[0, 3]], 1.0);
            let mut seen_padding = false;
            for particle in jet.outer_iter() {
                if particle[3] == 0.0 {
                    seen_padding = true;
                    assert!(particle.iter().all(|v| *v == 0.0));
                } else {
                    assert!(!seen_padding, "real particle after padding");
                }
            }
        }
    }

    #[test]
    fn test_jet_samples_are_seeded() {
        assert_eq!(jet_samples(10, 30, 3), jet_samples(10, 30, 3));
        assert_ne!(jet_samples(10, 30, 3), jet_samples(10, 30, 4));
    }

    #[test]
    fn test_write_samples_npy() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("g30.npy");
        let samples = jet_samples(5, 30, 0);

        write_samples_npy(&path, &samples);
        let read: Array3<f32> = ndarray_npy::read_npy(&path).unwrap();
        assert_eq!(read, samples);
        assert_eq!(file_md5(&path).len(), 32);
    }

    #[test]
    fn test_create_test_metadata() {
        let metadata = create_test_metadata();
        assert_eq!(metadata.sample_count(), 1);
        assert!(metadata.gen_samples["jetnet"].contains_key("g30"));
    }
}
