//! Resolution of reference ("real") samples.

use crate::ports::FetchRequest;
use crate::registry::DatasetRegistry;
use crate::samples::SampleSet;
use jetsim_domain::{EfpCacheLayout, EvalResult};
use ndarray::{s, Axis};
use std::path::Path;
use tracing::{info, instrument};

/// Produces populated reference sample sets through the dataset registry
#[derive(Debug, Clone)]
pub struct RealDataResolver {
    registry: DatasetRegistry,
    layout: EfpCacheLayout,
}

impl RealDataResolver {
    pub fn new(registry: DatasetRegistry) -> Self {
        Self {
            registry,
            layout: EfpCacheLayout::default(),
        }
    }

    pub fn with_cache_layout(mut self, layout: EfpCacheLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Fetch (or load) reference samples and keep the last `num_samples` jets.
    ///
    /// The returned set uses the provider's naming: `g30` becomes `g` while
    /// `g150` is kept. Its file lives at
    /// `<data_dir>/<dataset>/<normalized data_class>.hdf5`.
    #[instrument(skip(self, data_dir))]
    pub async fn get_real_samples(
        &self,
        dataset: &str,
        data_class: &str,
        data_dir: &Path,
        num_samples: usize,
    ) -> EvalResult<SampleSet> {
        let (entry, class) = self.registry.validate(dataset, data_class)?;

        let request = FetchRequest {
            dataset: dataset.to_string(),
            jet_type: class.jet_type().to_string(),
            num_particles: class.num_particles(),
            particle_features: entry.particle_features.clone(),
            data_dir: data_dir.join(dataset),
            download: true,
        };

        let full = entry.provider.fetch_or_load(&request).await?;
        let total = full.len_of(Axis(0));
        let start = total.saturating_sub(num_samples);
        let samples = full.slice_move(s![start.., .., ..]);
        info!(total, kept = samples.len_of(Axis(0)), "Resolved reference samples");

        let normalized = class.normalized();
        let download_path = request.data_dir.join(format!("{normalized}.hdf5"));

        Ok(SampleSet::new(dataset, normalized, download_path)
            .with_cache_layout(self.layout)
            .with_samples(samples))
    }
}
