//! Registry of supported reference datasets.
//!
//! Each entry says which data classes a dataset offers, which particle
//! features to request and which provider fetches it. New datasets are added
//! by registering an entry; the resolver itself never changes.

use crate::ports::DatasetProvider;
use jetsim_domain::{ConfigurationError, DataClass, EvalResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Capabilities of one reference dataset
#[derive(Clone)]
pub struct DatasetEntry {
    pub name: String,
    pub data_classes: BTreeSet<String>,
    /// Feature columns requested from the provider, in order
    pub particle_features: Vec<String>,
    pub provider: Arc<dyn DatasetProvider>,
}

impl DatasetEntry {
    pub fn new<I, S>(name: impl Into<String>, data_classes: I, provider: Arc<dyn DatasetProvider>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            data_classes: data_classes.into_iter().map(Into::into).collect(),
            particle_features: Vec::new(),
            provider,
        }
    }

    pub fn with_particle_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.particle_features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn supports(&self, data_class: &str) -> bool {
        self.data_classes.contains(data_class)
    }
}

impl fmt::Debug for DatasetEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetEntry")
            .field("name", &self.name)
            .field("data_classes", &self.data_classes)
            .field("particle_features", &self.particle_features)
            .finish_non_exhaustive()
    }
}

/// Supported reference datasets, keyed by name
#[derive(Debug, Clone, Default)]
pub struct DatasetRegistry {
    entries: BTreeMap<String, DatasetEntry>,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dataset, replacing any entry with the same name
    pub fn register(&mut self, entry: DatasetEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn with(mut self, entry: DatasetEntry) -> Self {
        self.register(entry);
        self
    }

    pub fn get(&self, dataset: &str) -> EvalResult<&DatasetEntry> {
        self.entries
            .get(dataset)
            .ok_or_else(|| ConfigurationError::UnsupportedDataset(dataset.to_string()).into())
    }

    /// Check a (dataset, data_class) selection and parse the class
    pub fn validate(&self, dataset: &str, data_class: &str) -> EvalResult<(&DatasetEntry, DataClass)> {
        let entry = self.get(dataset)?;
        if !entry.supports(data_class) {
            return Err(ConfigurationError::UnsupportedDataClass {
                dataset: dataset.to_string(),
                data_class: data_class.to_string(),
            }
            .into());
        }
        let class = DataClass::parse(dataset, data_class)?;
        Ok((entry, class))
    }

    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
