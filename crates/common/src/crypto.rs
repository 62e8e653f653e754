//! Checksum utilities.
//!
//! Sample files are verified against the MD5 or SHA-256 digest declared in a
//! submission's metadata. Files are hashed in chunks so that large HDF5
//! containers never need to be held in memory.

use jetsim_domain::ChecksumAlgorithm;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 64 * 1024;

/// Checksum verifier supporting multiple algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumVerifier {
    /// MD5 checksums
    Md5,
    /// SHA-256 checksums
    Sha256,
}

impl From<ChecksumAlgorithm> for ChecksumVerifier {
    fn from(algorithm: ChecksumAlgorithm) -> Self {
        match algorithm {
            ChecksumAlgorithm::Md5 => Self::Md5,
            ChecksumAlgorithm::Sha256 => Self::Sha256,
        }
    }
}

impl ChecksumVerifier {
    /// Compute a lowercase hex checksum for the given data.
    ///
    /// # Examples
    ///
    /// ```
    /// use jetsim_common::crypto::ChecksumVerifier;
    ///
    /// let checksum = ChecksumVerifier::Md5.compute(b"Hello, world!");
    /// assert_eq!(checksum, "6cd3556deb0da54bca060b4c39479839");
    /// ```
    pub fn compute(&self, data: &[u8]) -> String {
        match self {
            Self::Md5 => format!("{:x}", md5::compute(data)),
            Self::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(data);
                hex::encode(hasher.finalize())
            }
        }
    }

    /// Verify data against a checksum.
    pub fn verify(&self, data: &[u8], expected_checksum: &str) -> bool {
        constant_time_eq(&self.compute(data), expected_checksum)
    }

    /// Compute a checksum for a file, reading it in chunks.
    pub fn compute_file(&self, path: &Path) -> io::Result<String> {
        let mut file = File::open(path)?;
        let mut buffer = vec![0u8; CHUNK_SIZE];

        match self {
            Self::Md5 => {
                let mut context = md5::Context::new();
                loop {
                    let read = file.read(&mut buffer)?;
                    if read == 0 {
                        break;
                    }
                    context.consume(&buffer[..read]);
                }
                Ok(format!("{:x}", context.compute()))
            }
            Self::Sha256 => {
                let mut hasher = Sha256::new();
                loop {
                    let read = file.read(&mut buffer)?;
                    if read == 0 {
                        break;
                    }
                    hasher.update(&buffer[..read]);
                }
                Ok(hex::encode(hasher.finalize()))
            }
        }
    }

    /// Verify a file against a checksum.
    ///
    /// Returns whether the digest matched together with the digest actually
    /// computed, so callers can report both sides of a mismatch.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use jetsim_common::crypto::ChecksumVerifier;
    /// use std::path::Path;
    ///
    /// let (ok, actual) = ChecksumVerifier::Md5
    ///     .verify_file(Path::new("datasets/mp-gan/jetnet/g30.hdf5"), "abc123")
    ///     .expect("Failed to verify file");
    /// ```
    pub fn verify_file(&self, path: &Path, expected_checksum: &str) -> io::Result<(bool, String)> {
        let actual = self.compute_file(path)?;
        let expected = expected_checksum.trim().to_ascii_lowercase();
        Ok((constant_time_eq(&actual, &expected), actual))
    }
}

fn constant_time_eq(actual: &str, expected: &str) -> bool {
    if actual.len() != expected.len() {
        return false;
    }

    let mut result = 0u8;
    for (a, b) in actual.bytes().zip(expected.bytes()) {
        result |= a ^ b;
    }

    result == 0
}
