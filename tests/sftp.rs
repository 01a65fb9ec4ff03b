// ABOUTME: Integration tests for SFTP transfers against a real OpenSSH server.
// ABOUTME: Tests run against a shared SSH container and form the `docker` test group.

mod support;

use sftp_resource::sftp::{Error, RemoteClient, TransferError};
use support::init_tracing;
use support::ssh_container::shared_container;
use tempfile::TempDir;

/// Test: Upload a file then download it through the same client.
/// Expected: Downloaded bytes equal the uploaded file.
#[test_group::group(docker)]
#[tokio::test]
async fn upload_then_download_round_trips_contents() {
    init_tracing();
    let container = shared_container().await;
    let client = container.builder().build().expect("build should succeed");

    let dir = TempDir::new().unwrap();
    let local = dir.path().join("config.pkl");
    std::fs::write(&local, b"name = \"sftp\"\n").unwrap();

    client
        .upload(&local, "/tmp/config.pkl")
        .await
        .expect("upload should succeed");
    let data = client
        .download("/tmp/config.pkl")
        .await
        .expect("download should succeed");

    assert_eq!(data, b"name = \"sftp\"\n");

    client.close().await.expect("close should succeed");
}

/// Test: Download an existing system file.
#[test_group::group(docker)]
#[tokio::test]
async fn download_existing_file() {
    init_tracing();
    let container = shared_container().await;
    let client = container.builder().build_lazily();

    let data = client
        .download("/etc/passwd")
        .await
        .expect("download should succeed");

    assert!(String::from_utf8_lossy(&data).contains("root"));

    client.close().await.expect("close should succeed");
}

/// Test: Consecutive downloads reuse one client without reconnect errors.
#[test_group::group(docker)]
#[tokio::test]
async fn repeated_downloads_on_one_client() {
    let container = shared_container().await;
    let client = container.builder().build().expect("build should succeed");

    for _ in 0..3 {
        let data = client
            .download("/etc/hostname")
            .await
            .expect("download should succeed");
        assert!(!data.is_empty());
    }

    client.close().await.expect("close should succeed");
}

/// Test: Download of a missing remote file surfaces an SFTP error.
#[test_group::group(docker)]
#[tokio::test]
async fn missing_remote_file_returns_sftp_error() {
    let container = shared_container().await;
    let client = container.builder().build().expect("build should succeed");

    let err = client
        .download("/nonexistent/path/that/does/not/exist")
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Transfer(TransferError::Sftp(_))),
        "expected Sftp error, got: {:?}",
        err
    );

    client.close().await.expect("close should succeed");
}

/// Test: Unknown username is rejected by the server.
#[test_group::group(docker)]
#[tokio::test]
async fn wrong_username_returns_auth_error() {
    let container = shared_container().await;
    let client = container.builder().build().expect("build should succeed");
    client.set_username("nobody").unwrap();

    let err = client.download("/etc/passwd").await.unwrap_err();

    assert!(
        matches!(err, Error::Transfer(TransferError::AuthenticationFailed)),
        "expected AuthenticationFailed, got: {:?}",
        err
    );
}

/// Test: Changing the port after a transfer takes effect on the next session.
#[test_group::group(docker)]
#[tokio::test]
async fn port_change_applies_to_next_session() {
    let container = shared_container().await;
    let client = container.builder().build().expect("build should succeed");

    client
        .download("/etc/passwd")
        .await
        .expect("first download should succeed");

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let closed_port = listener.local_addr().unwrap().port();
    drop(listener);
    client.set_port(i32::from(closed_port)).unwrap();

    let err = client.download("/etc/passwd").await.unwrap_err();
    assert!(
        matches!(err, Error::Transfer(TransferError::Io(ref e)) if e.kind() == std::io::ErrorKind::ConnectionRefused),
        "expected connection refused, got: {:?}",
        err
    );

    client.set_port(i32::from(container.port())).unwrap();
    client
        .download("/etc/passwd")
        .await
        .expect("download after restoring port should succeed");

    client.close().await.expect("close should succeed");
}
