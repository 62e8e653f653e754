//! Submission loading and discovery.

use crate::samples::SampleSet;
use indexmap::IndexMap;
use jetsim_domain::{ConfigurationError, EfpCacheLayout, EvalResult, StorageError, SubmissionMetadata};
use std::path::{Component, Path};
use tracing::{debug, info, instrument};

/// File holding a submission's metadata
pub const METADATA_FILE: &str = "metadata.yml";

/// A submission and one sample set per declared (dataset, data_class)
#[derive(Debug, Clone)]
pub struct Submission {
    metadata: SubmissionMetadata,
    samples: IndexMap<String, IndexMap<String, SampleSet>>,
}

impl Submission {
    /// Expand the declared samples into sample sets under
    /// `<gen_datasets_dir>/<name>/<dataset>/<data_class>.hdf5`.
    pub fn new(metadata: SubmissionMetadata, gen_datasets_dir: &Path, layout: EfpCacheLayout) -> Self {
        let root = gen_datasets_dir.join(&metadata.name);
        let samples = metadata
            .gen_samples
            .iter()
            .map(|(dataset, classes)| {
                let sets = classes
                    .iter()
                    .map(|(data_class, source)| {
                        let path = root.join(dataset).join(format!("{data_class}.hdf5"));
                        let set = SampleSet::new(dataset.as_str(), data_class.as_str(), path)
                            .with_download_url(source.url.clone())
                            .with_checksum(source.checksum())
                            .with_cache_layout(layout);
                        (data_class.clone(), set)
                    })
                    .collect();
                (dataset.clone(), sets)
            })
            .collect();

        Self { metadata, samples }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn metadata(&self) -> &SubmissionMetadata {
        &self.metadata
    }

    /// dataset -> data_class -> sample set, in declaration order
    pub fn samples(&self) -> &IndexMap<String, IndexMap<String, SampleSet>> {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut IndexMap<String, IndexMap<String, SampleSet>> {
        &mut self.samples
    }

    pub fn sample_set(&self, dataset: &str, data_class: &str) -> Option<&SampleSet> {
        self.samples.get(dataset)?.get(data_class)
    }

    /// Number of declared sample sets
    pub fn len(&self) -> usize {
        self.samples.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read `<submission_dir>/<submission_name>/metadata.yml` and build the
/// submission. Nothing is downloaded.
#[instrument(skip(submission_dir, gen_datasets_dir, layout))]
pub fn load_submission(
    submission_dir: &Path,
    submission_name: &str,
    gen_datasets_dir: &Path,
    layout: EfpCacheLayout,
) -> EvalResult<Submission> {
    let path = submission_dir.join(submission_name).join(METADATA_FILE);
    if !path.is_file() {
        return Err(ConfigurationError::MetadataNotFound(path).into());
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| StorageError::io(&path, e))?;
    let metadata: SubmissionMetadata =
        serde_yaml::from_str(&contents).map_err(|e| ConfigurationError::InvalidMetadata {
            path: path.clone(),
            message: e.to_string(),
        })?;

    check_path_segment(&path, "name", &metadata.name)?;
    for (dataset, classes) in &metadata.gen_samples {
        check_path_segment(&path, "dataset", dataset)?;
        for data_class in classes.keys() {
            check_path_segment(&path, "data class", data_class)?;
        }
    }

    let submission = Submission::new(metadata, gen_datasets_dir, layout);
    info!(
        name = submission.name(),
        sample_sets = submission.len(),
        "Loaded submission"
    );
    Ok(submission)
}

/// Metadata values become directories under the generated-samples root, so
/// each must be a plain relative name.
fn check_path_segment(path: &Path, field: &str, value: &str) -> EvalResult<()> {
    let mut components = Path::new(value).components();
    let plain = matches!(components.next(), Some(Component::Normal(_)))
        && components.all(|c| matches!(c, Component::Normal(_)));

    if plain {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidMetadata {
            path: path.to_path_buf(),
            message: format!("{field} {value:?} must be a relative name without `..`"),
        }
        .into())
    }
}

/// Names of the submission directories under `submission_dir`, sorted.
///
/// Hidden entries and plain files are skipped.
pub fn discover_submissions(submission_dir: &Path) -> EvalResult<Vec<String>> {
    let entries =
        std::fs::read_dir(submission_dir).map_err(|e| StorageError::io(submission_dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StorageError::io(submission_dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }
        names.push(name);
    }
    names.sort();

    debug!(count = names.len(), dir = %submission_dir.display(), "Discovered submissions");
    Ok(names)
}
