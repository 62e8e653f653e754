//! JetNet reference dataset provider.
//!
//! JetNet ships one file per jet type and particle count:
//!
//! | Particles | File                   | Zenodo record |
//! |-----------|------------------------|---------------|
//! | 30        | `<jet_type>.hdf5`      | 6975118       |
//! | 150       | `<jet_type>150.hdf5`   | 6975117       |
//!
//! The `particle_features` columns are `etarel, phirel, ptrel, mask`. The
//! registry requests the three kinematic columns.

use async_trait::async_trait;
use jetsim_domain::{
    ConfigurationError, EvalError, EvalResult, PreconditionError, StorageError, TransportError,
};
use jetsim_evaluation::ports::{DatasetProvider, FetchRequest, SampleReader, Transfer};
use jetsim_evaluation::registry::{DatasetEntry, DatasetRegistry};
use ndarray::{Array3, Axis};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use url::Url;

/// Registry name of the dataset
pub const JETNET: &str = "jetnet";

/// Jet types offered by JetNet
pub const JET_TYPES: [&str; 5] = ["g", "q", "t", "w", "z"];

/// Column order of `particle_features`
pub const PARTICLE_FEATURES: [&str; 4] = ["etarel", "phirel", "ptrel", "mask"];

/// Features requested for reference samples
pub const KINEMATIC_FEATURES: [&str; 3] = ["etarel", "phirel", "ptrel"];

const ZENODO_RECORDS: &str = "https://zenodo.org/record";

/// Fetches JetNet files from Zenodo into the data directory and reads them
pub struct JetNetProvider {
    transfer: Arc<dyn Transfer>,
    reader: Arc<dyn SampleReader>,
    base_url: String,
}

impl JetNetProvider {
    pub fn new(transfer: Arc<dyn Transfer>, reader: Arc<dyn SampleReader>) -> Self {
        Self {
            transfer,
            reader,
            base_url: ZENODO_RECORDS.to_string(),
        }
    }

    /// Serve records from another host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// File name for a jet type and particle count
    pub fn file_name(jet_type: &str, num_particles: usize) -> String {
        if num_particles == 150 {
            format!("{jet_type}150.hdf5")
        } else {
            format!("{jet_type}.hdf5")
        }
    }

    /// Download URL of a JetNet file
    pub fn download_url(&self, jet_type: &str, num_particles: usize) -> EvalResult<Url> {
        let record = match num_particles {
            30 => "6975118",
            150 => "6975117",
            _ => {
                return Err(ConfigurationError::UnsupportedDataClass {
                    dataset: JETNET.to_string(),
                    data_class: format!("{jet_type}{num_particles}"),
                }
                .into())
            }
        };

        let file = Self::file_name(jet_type, num_particles);
        let url = format!("{}/{record}/files/{file}", self.base_url);
        Url::parse(&url).map_err(|e| {
            TransportError::Request {
                url: url.clone(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

/// Column indices of the requested features. No request means all columns.
fn feature_columns(dataset: &str, features: &[String]) -> EvalResult<Vec<usize>> {
    if features.is_empty() {
        return Ok((0..PARTICLE_FEATURES.len()).collect());
    }

    features
        .iter()
        .map(|feature| {
            PARTICLE_FEATURES
                .iter()
                .position(|known| *known == feature.as_str())
                .ok_or_else(|| {
                    EvalError::from(ConfigurationError::UnknownFeature {
                        dataset: dataset.to_string(),
                        feature: feature.clone(),
                    })
                })
        })
        .collect()
}

#[async_trait]
impl DatasetProvider for JetNetProvider {
    #[instrument(skip(self, request), fields(jet_type = %request.jet_type, num_particles = request.num_particles))]
    async fn fetch_or_load(&self, request: &FetchRequest) -> EvalResult<Array3<f32>> {
        let columns = feature_columns(&request.dataset, &request.particle_features)?;
        let path = request
            .data_dir
            .join(Self::file_name(&request.jet_type, request.num_particles));

        if path.is_file() {
            debug!(path = %path.display(), "Using local JetNet file");
        } else {
            if !request.download {
                return Err(PreconditionError::NotDownloaded(path).into());
            }

            let url = self.download_url(&request.jet_type, request.num_particles)?;
            tokio::fs::create_dir_all(&request.data_dir)
                .await
                .map_err(|e| StorageError::io(&request.data_dir, e))?;

            info!(url = %url, path = %path.display(), "Downloading JetNet");
            self.transfer.download(&url, &path).await?;
        }

        let samples = self.reader.read_particle_features(&path, None)?;
        let num_columns = samples.len_of(Axis(2));
        if let Some(missing) = columns.iter().find(|&&c| c >= num_columns) {
            return Err(StorageError::format(
                &path,
                format!("expected column {missing} in particle_features, found {num_columns} columns"),
            )
            .into());
        }

        if columns.iter().copied().eq(0..num_columns) {
            Ok(samples)
        } else {
            Ok(samples.select(Axis(2), &columns))
        }
    }
}

/// Registry holding JetNet with classes `{g,q,t,w,z} x {30,150}`
pub fn standard_registry(
    transfer: Arc<dyn Transfer>,
    reader: Arc<dyn SampleReader>,
) -> DatasetRegistry {
    let provider = Arc::new(JetNetProvider::new(transfer, reader));
    jetnet_registry(provider)
}

/// Registry holding JetNet served by `provider`
pub fn jetnet_registry(provider: Arc<dyn DatasetProvider>) -> DatasetRegistry {
    let data_classes = JET_TYPES
        .iter()
        .flat_map(|jet_type| [format!("{jet_type}30"), format!("{jet_type}150")]);

    DatasetRegistry::new().with(
        DatasetEntry::new(JETNET, data_classes, provider).with_particle_features(KINEMATIC_FEATURES),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(JetNetProvider::file_name("g", 30), "g.hdf5");
        assert_eq!(JetNetProvider::file_name("t", 150), "t150.hdf5");
    }

    #[test]
    fn test_feature_columns() {
        assert_eq!(feature_columns(JETNET, &[]).unwrap(), vec![0, 1, 2, 3]);

        let requested = vec!["ptrel".to_string(), "etarel".to_string()];
        assert_eq!(feature_columns(JETNET, &requested).unwrap(), vec![2, 0]);

        let err = feature_columns(JETNET, &["energy".to_string()]).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_FEATURE");
    }

    #[test]
    fn test_standard_classes() {
        let registry = jetnet_registry(Arc::new(
            JetNetProvider::new(
                Arc::new(crate::transfer::HttpTransfer::new()),
                Arc::new(crate::readers::ContainerReader),
            ),
        ));

        let entry = registry.get(JETNET).unwrap();
        assert_eq!(entry.data_classes.len(), 10);
        assert!(entry.supports("q150"));
        assert!(!entry.supports("g"));
        assert_eq!(entry.particle_features, KINEMATIC_FEATURES);
    }
}
