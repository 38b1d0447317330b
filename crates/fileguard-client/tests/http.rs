use fileguard_client::GuardClient;
use fileguard_core::{ContentSource, GuardError, ManifestSource};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GuardClient {
    GuardClient::builder()
        .checksums_url(format!("{}/core/checksums/1.0/", server.uri()))
        .content_url(format!("{}/WordPress/WordPress/", server.uri()))
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap()
}

#[tokio::test]
async fn fetches_manifest_for_version_and_locale() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/core/checksums/1.0/"))
        .and(query_param("version", "6.4.2"))
        .and(query_param("locale", "en_US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "checksums": {
                "index.php": "926dd0f95df723f9ed934eb058882cc8",
                "wp-includes/version.php": "0f2a5c0b4a6c8d7e9f1a2b3c4d5e6f70"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manifest = client_for(&server)
        .fetch_manifest("6.4.2", "en_US")
        .await
        .unwrap();

    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest.version(), "6.4.2");
    assert!(manifest.contains("wp-includes/version.php"));
}

#[tokio::test]
async fn unknown_version_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/core/checksums/1.0/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "checksums": false })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_manifest("0.0.1", "en_US")
        .await
        .unwrap_err();
    assert!(matches!(err, GuardError::ManifestUnavailable { .. }));
}

#[tokio::test]
async fn server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/core/checksums/1.0/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_manifest("6.4.2", "en_US")
        .await
        .unwrap_err();
    match err {
        GuardError::ManifestUnavailable { reason, .. } => assert!(reason.contains("503")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn garbage_body_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/core/checksums/1.0/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_manifest("6.4.2", "en_US")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid JSON"));
}

#[tokio::test]
async fn slow_manifest_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/core/checksums/1.0/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "checksums": false }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_manifest("6.4.2", "en_US")
        .await
        .unwrap_err();
    match err {
        GuardError::ManifestUnavailable { reason, .. } => assert!(reason.contains("timed out")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn fetches_versioned_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/WordPress/WordPress/6.4.2/wp-admin/index.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<?php // admin"))
        .expect(1)
        .mount(&server)
        .await;

    let body = client_for(&server)
        .fetch_file("6.4.2", "wp-admin/index.php")
        .await
        .unwrap();
    assert_eq!(body, b"<?php // admin");
}

#[tokio::test]
async fn missing_content_is_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_file("6.4.2", "index.php")
        .await
        .unwrap_err();
    match err {
        GuardError::FetchFailed { path, reason } => {
            assert_eq!(path, "index.php");
            assert!(reason.contains("404"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
