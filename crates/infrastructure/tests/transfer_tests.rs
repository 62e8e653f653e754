//! Integration tests for the HTTP transfer

use jetsim_evaluation::ports::Transfer;
use jetsim_infrastructure::HttpTransfer;
use jetsim_testing::tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transfer() -> HttpTransfer {
    HttpTransfer::new().with_progress(false)
}

#[tokio::test]
async fn test_download_writes_body() {
    let server = MockServer::start().await;
    let body = vec![7u8; 100_000];
    Mock::given(method("GET"))
        .and(path("/mp-gan/g30.hdf5"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("g30.hdf5");
    let url = Url::parse(&format!("{}/mp-gan/g30.hdf5", server.uri())).unwrap();

    let bytes = transfer().download(&url, &dest).await.unwrap();

    assert_eq!(bytes, body.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
    assert!(!temp_dir.path().join("g30.hdf5.part").exists());
}

#[tokio::test]
async fn test_error_status_leaves_no_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("g30.hdf5");
    let url = Url::parse(&format!("{}/missing.hdf5", server.uri())).unwrap();

    let err = transfer().download(&url, &dest).await.unwrap_err();

    assert_eq!(err.error_code(), "TRANSPORT_ERROR");
    assert!(err.to_string().contains("404"));
    assert!(!dest.exists());
    assert!(!temp_dir.path().join("g30.hdf5.part").exists());
}

#[tokio::test]
async fn test_unreachable_host() {
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("g30.hdf5");
    let url = Url::parse("http://127.0.0.1:1/g30.hdf5").unwrap();

    let err = transfer().download(&url, &dest).await.unwrap_err();

    assert_eq!(err.error_code(), "TRANSPORT_ERROR");
    assert!(!dest.exists());
}
