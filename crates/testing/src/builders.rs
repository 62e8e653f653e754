//! Fluent builders for submission metadata.

use indexmap::IndexMap;
use jetsim_domain::{SampleSource, SubmissionMetadata};
use url::Url;

/// Builder for [`SubmissionMetadata`] test instances
#[derive(Clone)]
pub struct SubmissionMetadataBuilder {
    name: String,
    authors: Vec<String>,
    affiliations: Vec<String>,
    gen_samples: IndexMap<String, IndexMap<String, SampleSource>>,
    container_path: Option<String>,
}

impl SubmissionMetadataBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            authors: vec![],
            affiliations: vec![],
            gen_samples: IndexMap::new(),
            container_path: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliations.push(affiliation.into());
        self
    }

    pub fn with_container_path(mut self, path: impl Into<String>) -> Self {
        self.container_path = Some(path.into());
        self
    }

    /// Declare a generated sample for `dataset/data_class`
    pub fn with_sample(
        mut self,
        dataset: impl Into<String>,
        data_class: impl Into<String>,
        url: &str,
        md5: Option<&str>,
    ) -> Self {
        let source = SampleSource {
            url: Url::parse(url).unwrap(),
            md5: md5.map(str::to_string),
            sha256: None,
        };
        self.gen_samples
            .entry(dataset.into())
            .or_default()
            .insert(data_class.into(), source);
        self
    }

    pub fn build(self) -> SubmissionMetadata {
        SubmissionMetadata {
            name: self.name,
            authors: self.authors,
            affiliations: self.affiliations,
            gen_samples: self.gen_samples,
            container_path: self.container_path,
            inference_command: None,
            model_repository: None,
        }
    }

    /// The metadata as `metadata.yml` content
    pub fn to_yaml(&self) -> String {
        serde_yaml::to_string(&self.clone().build()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_groups_by_dataset() {
        let metadata = SubmissionMetadataBuilder::new("mp-gan")
            .with_author("A. Author")
            .with_affiliation("Somewhere")
            .with_container_path("docker://mp-gan:latest")
            .with_sample("jetnet", "g30", "https://example.org/g30.npy", Some("abc"))
            .with_sample("jetnet", "t30", "https://example.org/t30.npy", None)
            .build();

        assert_eq!(metadata.affiliations, vec!["Somewhere".to_string()]);
        assert_eq!(metadata.container_path.as_deref(), Some("docker://mp-gan:latest"));
        assert_eq!(metadata.sample_count(), 2);
        assert_eq!(metadata.gen_samples.len(), 1);
        assert_eq!(
            metadata.gen_samples["jetnet"]["g30"].md5.as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_to_yaml_parses_back() {
        let yaml = SubmissionMetadataBuilder::new("mp-gan")
            .with_sample("jetnet", "g30", "https://example.org/g30.npy", None)
            .to_yaml();

        let parsed: SubmissionMetadata = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.name, "mp-gan");
        assert_eq!(parsed.sample_count(), 1);
    }
}
