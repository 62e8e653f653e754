//! Integration tests for reference sample resolution

use jetsim_evaluation::{DatasetEntry, DatasetRegistry, RealDataResolver};
use jetsim_testing::tempfile::TempDir;
use jetsim_testing::MockDatasetProvider;
use std::sync::Arc;

const FEATURES: [&str; 4] = ["etarel", "phirel", "ptrel", "mask"];

fn resolver(provider: Arc<MockDatasetProvider>) -> RealDataResolver {
    let entry = DatasetEntry::new("jetnet", ["g30", "g150", "t30"], provider)
        .with_particle_features(FEATURES);
    RealDataResolver::new(DatasetRegistry::new().with(entry))
}

#[tokio::test]
async fn test_thirty_particle_class_is_normalized() {
    let temp_dir = TempDir::new().unwrap();
    let provider = Arc::new(MockDatasetProvider::indexed(100, 30, 4));

    let real = resolver(provider.clone())
        .get_real_samples("jetnet", "g30", temp_dir.path(), 50)
        .await
        .unwrap();

    assert_eq!(real.dataset(), "jetnet");
    assert_eq!(real.data_class(), "g");
    assert_eq!(real.download_path(), temp_dir.path().join("jetnet").join("g.hdf5"));

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].jet_type, "g");
    assert_eq!(requests[0].num_particles, 30);
    assert_eq!(requests[0].particle_features, FEATURES);
    assert_eq!(requests[0].data_dir, temp_dir.path().join("jetnet"));
    assert!(requests[0].download);
}

#[tokio::test]
async fn test_one_fifty_particle_class_is_kept() {
    let temp_dir = TempDir::new().unwrap();
    let provider = Arc::new(MockDatasetProvider::indexed(10, 150, 4));

    let real = resolver(provider.clone())
        .get_real_samples("jetnet", "g150", temp_dir.path(), 50)
        .await
        .unwrap();

    assert_eq!(real.data_class(), "g150");
    assert_eq!(provider.requests()[0].num_particles, 150);
    assert_eq!(real.samples().unwrap().shape(), &[10, 150, 4]);
}

#[tokio::test]
async fn test_keeps_last_rows() {
    let temp_dir = TempDir::new().unwrap();
    let provider = Arc::new(MockDatasetProvider::indexed(5000, 2, 4));

    let real = resolver(provider)
        .get_real_samples("jetnet", "g30", temp_dir.path(), 1000)
        .await
        .unwrap();

    let samples = real.samples().unwrap();
    assert_eq!(samples.shape(), &[1000, 2, 4]);
    assert_eq!(samples[[0, 0, 0]], 4000.0);
    assert_eq!(samples[[999, 1, 3]], 4999.0);
}

#[tokio::test]
async fn test_unsupported_selection() {
    let temp_dir = TempDir::new().unwrap();
    let provider = Arc::new(MockDatasetProvider::indexed(10, 30, 4));
    let resolver = resolver(provider.clone());

    let err = resolver
        .get_real_samples("top-tagging", "g30", temp_dir.path(), 10)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNSUPPORTED_DATASET");

    let err = resolver
        .get_real_samples("jetnet", "q30", temp_dir.path(), 10)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNSUPPORTED_DATA_CLASS");

    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_provider_failure_is_returned() {
    let temp_dir = TempDir::new().unwrap();
    let provider = Arc::new(MockDatasetProvider::indexed(10, 30, 4).failing_for("t"));

    let err = resolver(provider)
        .get_real_samples("jetnet", "t30", temp_dir.path(), 10)
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "TRANSPORT_ERROR");
}
