//! Sample readers for `.npy` arrays and HDF5 containers.
//!
//! Both formats carry a `(num_jets, num_particles, num_features)` `f32` array.
//! In HDF5 files it is the `particle_features` dataset.

use jetsim_domain::{EvalResult, StorageError};
use jetsim_evaluation::ports::SampleReader;
use ndarray::{s, Array3, Axis};
use ndarray_npy::ReadNpyExt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Name of the particle array inside HDF5 containers
pub const PARTICLE_FEATURES: &str = "particle_features";

const NPY_MAGIC: &[u8] = b"\x93NUMPY";

/// Container formats understood by [`ContainerReader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Npy,
    Hdf5,
}

impl ContainerFormat {
    /// `.npy` by extension; otherwise the file header decides.
    pub fn detect(path: &Path) -> EvalResult<Self> {
        if path.extension().is_some_and(|ext| ext == "npy") {
            return Ok(Self::Npy);
        }

        let mut header = [0u8; 6];
        let mut file = File::open(path).map_err(|e| StorageError::io(path, e))?;
        let read = file
            .read(&mut header)
            .map_err(|e| StorageError::io(path, e))?;

        if header[..read] == *NPY_MAGIC {
            Ok(Self::Npy)
        } else {
            Ok(Self::Hdf5)
        }
    }
}

/// Reads `.npy` files
#[derive(Debug, Clone, Copy, Default)]
pub struct NpyReader;

impl SampleReader for NpyReader {
    fn read_particle_features(
        &self,
        path: &Path,
        limit: Option<usize>,
    ) -> EvalResult<Array3<f32>> {
        let file = File::open(path).map_err(|e| StorageError::io(path, e))?;
        let samples = Array3::<f32>::read_npy(BufReader::new(file))
            .map_err(|e| StorageError::format(path, e))?;
        Ok(keep_first(samples, limit))
    }
}

/// Reads the `particle_features` dataset of HDF5 files
#[cfg(feature = "hdf5")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Hdf5Reader;

#[cfg(feature = "hdf5")]
impl SampleReader for Hdf5Reader {
    fn read_particle_features(
        &self,
        path: &Path,
        limit: Option<usize>,
    ) -> EvalResult<Array3<f32>> {
        let file = hdf5::File::open(path).map_err(|e| StorageError::format(path, e))?;
        let dataset = file
            .dataset(PARTICLE_FEATURES)
            .map_err(|e| StorageError::format(path, e))?;

        let total = dataset.shape().first().copied().unwrap_or(0);
        let samples = match limit {
            Some(n) if n < total => dataset.read_slice::<f32, _, ndarray::Ix3>(s![..n, .., ..]),
            _ => dataset.read::<f32, ndarray::Ix3>(),
        }
        .map_err(|e| StorageError::format(path, e))?;

        Ok(samples)
    }
}

/// Picks the reader matching the file format
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerReader;

impl SampleReader for ContainerReader {
    fn read_particle_features(
        &self,
        path: &Path,
        limit: Option<usize>,
    ) -> EvalResult<Array3<f32>> {
        let format = ContainerFormat::detect(path)?;
        debug!(path = %path.display(), ?format, "Reading samples");

        match format {
            ContainerFormat::Npy => NpyReader.read_particle_features(path, limit),
            ContainerFormat::Hdf5 => read_hdf5(path, limit),
        }
    }
}

#[cfg(feature = "hdf5")]
fn read_hdf5(path: &Path, limit: Option<usize>) -> EvalResult<Array3<f32>> {
    Hdf5Reader.read_particle_features(path, limit)
}

#[cfg(not(feature = "hdf5"))]
fn read_hdf5(path: &Path, _limit: Option<usize>) -> EvalResult<Array3<f32>> {
    Err(StorageError::format(
        path,
        "HDF5 container, but jetsim was built without the `hdf5` feature",
    )
    .into())
}

fn keep_first(samples: Array3<f32>, limit: Option<usize>) -> Array3<f32> {
    match limit {
        Some(n) if n < samples.len_of(Axis(0)) => samples.slice_move(s![..n, .., ..]),
        _ => samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray_npy::write_npy;
    use tempfile::TempDir;

    fn indexed(num_jets: usize) -> Array3<f32> {
        Array3::from_shape_fn((num_jets, 3, 4), |(j, _, _)| j as f32)
    }

    #[test]
    fn test_npy_reader_limit() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("g30.npy");
        write_npy(&path, &indexed(10)).unwrap();

        let all = NpyReader.read_particle_features(&path, None).unwrap();
        assert_eq!(all.shape(), &[10, 3, 4]);

        let first = NpyReader.read_particle_features(&path, Some(4)).unwrap();
        assert_eq!(first.shape(), &[4, 3, 4]);
        assert_eq!(first[[3, 0, 0]], 3.0);

        let more = NpyReader.read_particle_features(&path, Some(50)).unwrap();
        assert_eq!(more.shape(), &[10, 3, 4]);
    }

    #[test]
    fn test_detect_npy_content_behind_hdf5_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("g30.hdf5");
        write_npy(&path, &indexed(2)).unwrap();

        assert_eq!(ContainerFormat::detect(&path).unwrap(), ContainerFormat::Npy);
        let samples = ContainerReader.read_particle_features(&path, None).unwrap();
        assert_eq!(samples.shape(), &[2, 3, 4]);
    }

    #[test]
    fn test_detect_hdf5_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("g30.hdf5");
        std::fs::write(&path, b"\x89HDF\r\n\x1a\n").unwrap();

        assert_eq!(ContainerFormat::detect(&path).unwrap(), ContainerFormat::Hdf5);
    }

    #[test]
    fn test_missing_file_is_storage_error() {
        let err = NpyReader
            .read_particle_features(Path::new("/nonexistent/g30.npy"), None)
            .unwrap_err();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }

    #[test]
    fn test_garbage_npy_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.npy");
        std::fs::write(&path, b"not an array").unwrap();

        let err = ContainerReader.read_particle_features(&path, None).unwrap_err();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }
}
