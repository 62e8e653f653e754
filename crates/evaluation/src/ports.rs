//! Ports for the external collaborators of the pipeline.
//!
//! Implementations live in `jetsim-infrastructure`; test doubles live in
//! `jetsim-testing`.

use async_trait::async_trait;
use jetsim_domain::EvalResult;
use ndarray::Array3;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Fetches a remote file to a local path
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Download `url` into `dest` and return the number of bytes written.
    ///
    /// The parent directory of `dest` already exists. On failure `dest` must
    /// not be left behind.
    async fn download(&self, url: &Url, dest: &Path) -> EvalResult<u64>;
}

/// Reads the `particle_features` array out of a sample container
pub trait SampleReader: Send + Sync {
    /// Read `(num_jets, num_particles, num_features)`, keeping at most the
    /// first `limit` jets.
    fn read_particle_features(&self, path: &Path, limit: Option<usize>)
        -> EvalResult<Array3<f32>>;
}

/// Parameters for fetching a reference dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub dataset: String,
    /// Jet type without the particle-count suffix, e.g. `g`
    pub jet_type: String,
    pub num_particles: usize,
    /// Feature columns to return, in order
    pub particle_features: Vec<String>,
    /// Directory holding (or receiving) the dataset files
    pub data_dir: PathBuf,
    /// Whether a missing file may be downloaded
    pub download: bool,
}

/// Loads reference samples, downloading them first when needed
#[async_trait]
pub trait DatasetProvider: Send + Sync {
    async fn fetch_or_load(&self, request: &FetchRequest) -> EvalResult<Array3<f32>>;
}

/// Transfer and reader used to materialize generated samples
#[derive(Clone)]
pub struct SampleIo {
    pub transfer: Arc<dyn Transfer>,
    pub reader: Arc<dyn SampleReader>,
    /// Jets kept per sample set
    pub num_samples: usize,
}

impl SampleIo {
    pub fn new(transfer: Arc<dyn Transfer>, reader: Arc<dyn SampleReader>) -> Self {
        Self {
            transfer,
            reader,
            num_samples: 50_000,
        }
    }

    pub fn with_num_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }
}
