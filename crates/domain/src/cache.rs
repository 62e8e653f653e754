//! On-disk layout of derived-feature caches.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How EFP cache files are named next to a sample file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EfpCacheLayout {
    /// `<dataset>_<data_class>_efps.npy`
    #[default]
    Qualified,
    /// `<data_class>_efps.npy`, as written by earlier runs
    Legacy,
}

impl EfpCacheLayout {
    /// File name of the cache for a dataset/data_class pair
    pub fn file_name(&self, dataset: &str, data_class: &str) -> String {
        match self {
            Self::Qualified => format!("{dataset}_{data_class}_efps.npy"),
            Self::Legacy => format!("{data_class}_efps.npy"),
        }
    }

    /// Cache path derived from the directory holding `download_path`
    pub fn efps_path(&self, download_path: &Path, dataset: &str, data_class: &str) -> PathBuf {
        let parent = download_path.parent().unwrap_or_else(|| Path::new(""));
        parent.join(self.file_name(dataset, data_class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_path() {
        let path = EfpCacheLayout::Legacy.efps_path(
            Path::new("datasets/sub/jetnet/g30.hdf5"),
            "jetnet",
            "g30",
        );
        assert_eq!(path, PathBuf::from("datasets/sub/jetnet/g30_efps.npy"));
    }

    #[test]
    fn test_qualified_path() {
        let path = EfpCacheLayout::Qualified.efps_path(
            Path::new("datasets/jetnet/g.hdf5"),
            "jetnet",
            "g",
        );
        assert_eq!(path, PathBuf::from("datasets/jetnet/jetnet_g_efps.npy"));
    }

    #[test]
    fn test_bare_file_name() {
        let path = EfpCacheLayout::Legacy.efps_path(Path::new("g30.hdf5"), "jetnet", "g30");
        assert_eq!(path, PathBuf::from("g30_efps.npy"));
    }
}
