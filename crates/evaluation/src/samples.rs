//! Sample sets: one dataset/data_class collection of jets.
//!
//! A `SampleSet` tracks where its file lives, whether it is on disk, the
//! loaded particle array and the derived EFP array. EFPs are expensive, so
//! they are persisted next to the sample file and looked up before being
//! recomputed.

use crate::metrics::MetricsProvider;
use crate::ports::{SampleIo, SampleReader};
use jetsim_common::crypto::ChecksumVerifier;
use jetsim_domain::{
    Checksum, ConfigurationError, EfpCacheLayout, EvalError, EvalResult, IntegrityError,
    PreconditionError, StorageError,
};
use ndarray::{Array2, Array3, Axis};
use ndarray_npy::{read_npy, write_npy};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// One dataset/data_class collection of jets
#[derive(Debug, Clone)]
pub struct SampleSet {
    dataset: String,
    data_class: String,
    download_url: Option<Url>,
    download_path: PathBuf,
    downloaded: bool,
    checksum: Option<Checksum>,
    samples: Option<Array3<f32>>,
    efps_path: PathBuf,
    efps: Option<Array2<f64>>,
}

impl SampleSet {
    /// Create a sample set backed by `download_path`.
    ///
    /// Only checks whether the file exists; nothing is read.
    pub fn new(
        dataset: impl Into<String>,
        data_class: impl Into<String>,
        download_path: impl Into<PathBuf>,
    ) -> Self {
        let dataset = dataset.into();
        let data_class = data_class.into();
        let download_path = download_path.into();
        let efps_path = EfpCacheLayout::default().efps_path(&download_path, &dataset, &data_class);
        let downloaded = download_path.is_file();

        Self {
            dataset,
            data_class,
            download_url: None,
            download_path,
            downloaded,
            checksum: None,
            samples: None,
            efps_path,
            efps: None,
        }
    }

    pub fn with_download_url(mut self, url: Url) -> Self {
        self.download_url = Some(url);
        self
    }

    pub fn with_checksum(mut self, checksum: Option<Checksum>) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn with_cache_layout(mut self, layout: EfpCacheLayout) -> Self {
        self.efps_path = layout.efps_path(&self.download_path, &self.dataset, &self.data_class);
        self
    }

    /// Attach samples that were obtained elsewhere
    pub fn with_samples(mut self, samples: Array3<f32>) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn data_class(&self) -> &str {
        &self.data_class
    }

    pub fn download_url(&self) -> Option<&Url> {
        self.download_url.as_ref()
    }

    pub fn download_path(&self) -> &Path {
        &self.download_path
    }

    pub fn is_downloaded(&self) -> bool {
        self.downloaded
    }

    pub fn checksum(&self) -> Option<&Checksum> {
        self.checksum.as_ref()
    }

    pub fn samples(&self) -> Option<&Array3<f32>> {
        self.samples.as_ref()
    }

    pub fn efps_path(&self) -> &Path {
        &self.efps_path
    }

    pub fn efps(&self) -> Option<&Array2<f64>> {
        self.efps.as_ref()
    }

    /// Fetch the sample file if needed, then load it.
    ///
    /// An existing file is reused unless `overwrite` is set. A fetched file
    /// invalidates its EFP cache. Transfer errors are returned as is; nothing
    /// is retried.
    #[instrument(skip(self, io), fields(dataset = %self.dataset, data_class = %self.data_class))]
    pub async fn download(&mut self, io: &SampleIo, overwrite: bool) -> EvalResult<()> {
        if self.downloaded && !overwrite {
            debug!(path = %self.download_path.display(), "Sample file present, skipping download");
        } else {
            let url = self
                .download_url
                .clone()
                .ok_or_else(|| ConfigurationError::MissingDownloadUrl {
                    dataset: self.dataset.clone(),
                    data_class: self.data_class.clone(),
                })?;

            if let Some(parent) = self.download_path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::io(parent, e))?;
            }

            info!(url = %url, path = %self.download_path.display(), "Downloading samples");
            let bytes = io.transfer.download(&url, &self.download_path).await?;
            debug!(bytes, "Download complete");
            self.downloaded = true;

            // EFPs cached for a previous file no longer describe these samples
            match tokio::fs::remove_file(&self.efps_path).await {
                Ok(()) => debug!(path = %self.efps_path.display(), "Removed EFP cache"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StorageError::io(&self.efps_path, e).into()),
            }
        }

        self.load_samples(io.reader.as_ref(), io.num_samples)
    }

    /// Load the first `num_samples` jets from disk.
    ///
    /// A declared checksum is verified first. A mismatching file is left in
    /// place for inspection.
    #[instrument(skip(self, reader), fields(dataset = %self.dataset, data_class = %self.data_class))]
    pub fn load_samples(&mut self, reader: &dyn SampleReader, num_samples: usize) -> EvalResult<()> {
        if !self.downloaded {
            return Err(PreconditionError::NotDownloaded(self.download_path.clone()).into());
        }

        if let Some(checksum) = &self.checksum {
            verify_checksum(&self.download_path, checksum)?;
        }

        let samples = reader.read_particle_features(&self.download_path, Some(num_samples))?;
        info!(shape = ?samples.shape(), "Loaded samples");

        self.samples = Some(samples);
        self.efps = None;
        Ok(())
    }

    /// Look up the on-disk EFP cache.
    ///
    /// Returns whether EFPs are now held in memory.
    pub fn load_cached_efps(&mut self) -> EvalResult<bool> {
        if self.efps.is_some() {
            return Ok(true);
        }
        if !self.efps_path.is_file() {
            return Ok(false);
        }

        let efps: Array2<f64> =
            read_npy(&self.efps_path).map_err(|e| StorageError::format(&self.efps_path, e))?;
        debug!(path = %self.efps_path.display(), shape = ?efps.shape(), "Loaded cached EFPs");
        self.efps = Some(efps);
        Ok(true)
    }

    /// EFPs of the loaded samples, computed at most once.
    ///
    /// Looks in memory, then in the on-disk cache, and only then asks the
    /// metrics provider. Freshly computed EFPs are written to `efps_path`.
    #[instrument(skip(self, metrics), fields(dataset = %self.dataset, data_class = %self.data_class))]
    pub fn get_efps(&mut self, metrics: &dyn MetricsProvider) -> EvalResult<&Array2<f64>> {
        if self.samples.is_none() {
            return Err(self.not_loaded());
        }

        if self.efps.is_none() {
            if let Err(e) = self.load_cached_efps() {
                warn!(error = %e, "Ignoring unreadable EFP cache");
            }
        }

        let Some(samples) = self.samples.as_ref() else {
            return Err(self.not_loaded());
        };
        let num_jets = samples.len_of(Axis(0));

        let efps = match self.efps.take() {
            Some(efps) if efps.nrows() == num_jets => efps,
            stale => {
                if let Some(stale) = stale {
                    warn!(
                        cached_rows = stale.nrows(),
                        num_jets, "EFP cache does not match samples, recomputing"
                    );
                }
                info!(num_jets, "Computing EFPs");
                let efps = metrics.energy_flow_polynomials(samples.view())?;
                persist_efps(&self.efps_path, &efps)?;
                efps
            }
        };

        Ok(&*self.efps.insert(efps))
    }

    fn not_loaded(&self) -> EvalError {
        PreconditionError::SamplesNotLoaded {
            dataset: self.dataset.clone(),
            data_class: self.data_class.clone(),
        }
        .into()
    }
}

fn verify_checksum(path: &Path, checksum: &Checksum) -> EvalResult<()> {
    let verifier = ChecksumVerifier::from(checksum.algorithm);
    let (ok, actual) = verifier
        .verify_file(path, &checksum.expected)
        .map_err(|e| StorageError::io(path, e))?;

    if !ok {
        return Err(IntegrityError::ChecksumMismatch {
            path: path.to_path_buf(),
            algorithm: checksum.algorithm.to_string(),
            expected: checksum.expected.clone(),
            actual,
        }
        .into());
    }

    debug!(path = %path.display(), algorithm = %checksum.algorithm, "Checksum verified");
    Ok(())
}

fn persist_efps(path: &Path, efps: &Array2<f64>) -> EvalResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }
    write_npy(path, efps).map_err(|e| StorageError::format(path, e))?;
    debug!(path = %path.display(), "Persisted EFPs");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_does_not_touch_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jetnet").join("g30.hdf5");

        let set = SampleSet::new("jetnet", "g30", &path);
        assert!(!set.is_downloaded());
        assert!(set.efps().is_none());
        assert_eq!(
            set.efps_path(),
            dir.path().join("jetnet").join("jetnet_g30_efps.npy")
        );
    }

    #[test]
    fn test_layout_changes_efps_path() {
        let set = SampleSet::new("jetnet", "g30", "gen/mp-gan/jetnet/g30.hdf5")
            .with_cache_layout(EfpCacheLayout::Legacy);
        assert_eq!(set.efps_path(), Path::new("gen/mp-gan/jetnet/g30_efps.npy"));
    }

    #[test]
    fn test_existing_file_counts_as_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g30.hdf5");
        std::fs::write(&path, b"data").unwrap();

        assert!(SampleSet::new("jetnet", "g30", &path).is_downloaded());
    }

    #[test]
    fn test_checksum_mismatch_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g30.hdf5");
        std::fs::write(&path, b"data").unwrap();

        let err = verify_checksum(&path, &Checksum::md5("abc123")).unwrap_err();
        assert_eq!(err.error_code(), "CHECKSUM_MISMATCH");
        assert!(path.exists());
    }

    #[test]
    fn test_load_cached_efps_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = SampleSet::new("jetnet", "g30", dir.path().join("g30.hdf5"));
        assert!(!set.load_cached_efps().unwrap());
    }

    #[test]
    fn test_load_cached_efps_present() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = SampleSet::new("jetnet", "g30", dir.path().join("g30.hdf5"));
        write_npy(set.efps_path(), &Array2::<f64>::ones((4, 8))).unwrap();

        assert!(set.load_cached_efps().unwrap());
        assert_eq!(set.efps().map(|e| e.dim()), Some((4, 8)));
    }
}
