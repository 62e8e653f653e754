//! Submission metadata records, as read from `metadata.yml`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Submission metadata
///
/// Unknown fields are rejected so that typos in `metadata.yml` surface as
/// load errors instead of silently dropped settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmissionMetadata {
    pub name: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub affiliations: Vec<String>,
    /// dataset -> data_class -> source
    pub gen_samples: IndexMap<String, IndexMap<String, SampleSource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_repository: Option<String>,
}

impl SubmissionMetadata {
    /// Number of declared (dataset, data_class) pairs
    pub fn sample_count(&self) -> usize {
        self.gen_samples.values().map(IndexMap::len).sum()
    }
}

/// Where a generated sample file comes from
///
/// Keys other than the URL and digests are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSource {
    pub url: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl SampleSource {
    /// Declared checksum, MD5 taking precedence
    pub fn checksum(&self) -> Option<Checksum> {
        self.md5
            .as_ref()
            .map(|h| Checksum::new(ChecksumAlgorithm::Md5, h))
            .or_else(|| {
                self.sha256
                    .as_ref()
                    .map(|h| Checksum::new(ChecksumAlgorithm::Sha256, h))
            })
    }
}

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Md5,
    Sha256,
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Md5 => write!(f, "md5"),
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Expected digest of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    pub algorithm: ChecksumAlgorithm,
    /// Lowercase hex digest
    pub expected: String,
}

impl Checksum {
    pub fn new(algorithm: ChecksumAlgorithm, expected: impl AsRef<str>) -> Self {
        Self {
            algorithm,
            expected: expected.as_ref().trim().to_ascii_lowercase(),
        }
    }

    pub fn md5(expected: impl AsRef<str>) -> Self {
        Self::new(ChecksumAlgorithm::Md5, expected)
    }
}
