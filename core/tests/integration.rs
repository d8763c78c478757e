//! End-to-end tests against the live mock ClickHouse endpoint.
//!
//! # Design
//! Starts the mock server on a random port, then drives the full
//! build → send → normalize path over real HTTP: both query transports
//! (GET parameter and POST body), every supported compression
//! algorithm, the permissive unknown-algorithm case, upstream error
//! mapping, authentication priority, context passthrough, and
//! concurrent calls on a shared client.

use clickhouse_core::{ClickhouseClient, ClientError, DatasourceSettings, SecureData};
use tokio::net::TcpListener;

/// Boot the mock server on an ephemeral port and return its base URL.
async fn start_mock() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        mock_server::run(listener).await.unwrap();
    });
    format!("http://{addr}")
}

fn settings(url: &str) -> DatasourceSettings {
    DatasourceSettings {
        url: url.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn get_query_round_trip() {
    let url = start_mock().await;
    let client = ClickhouseClient::new(settings(&url));

    let response = client.query(1u64, "SELECT 1").await.unwrap();
    assert_eq!(response.ctx, 1);
    assert_eq!(response.body, "1\n");
}

#[tokio::test]
async fn post_query_round_trip() {
    let url = start_mock().await;
    let client = ClickhouseClient::new(DatasourceSettings {
        use_post: true,
        ..settings(&url)
    });

    let response = client.query((), "SELECT version()").await.unwrap();
    assert_eq!(response.body, "24.3.1.2672\n");
}

#[tokio::test]
async fn every_supported_compression_round_trips() {
    let url = start_mock().await;

    for algorithm in ["gzip", "br", "deflate", "zstd"] {
        let client = ClickhouseClient::new(DatasourceSettings {
            use_compression: true,
            compression_type: algorithm.to_string(),
            ..settings(&url)
        });
        let response = client.query((), "SELECT 1").await.unwrap();
        assert_eq!(response.body, "1\n", "algorithm {algorithm}");
    }
}

#[tokio::test]
async fn unknown_compression_algorithm_still_succeeds() {
    let url = start_mock().await;
    let client = ClickhouseClient::new(DatasourceSettings {
        use_compression: true,
        compression_type: "lz4".to_string(),
        ..settings(&url)
    });

    // Negotiation is silently skipped; the query itself still runs.
    let response = client.query((), "SELECT 1").await.unwrap();
    assert_eq!(response.body, "1\n");
}

#[tokio::test]
async fn syntax_error_maps_to_upstream_with_server_body() {
    let url = start_mock().await;
    let client = ClickhouseClient::new(settings(&url));

    let err = client.query((), "SELECTT 1").await.unwrap_err();
    match err {
        ClientError::Upstream(message) => {
            assert_eq!(
                message,
                "Code: 62. DB::Exception: Syntax error: failed at position 1: SELECTT 1"
            );
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn basic_auth_identifies_the_user() {
    let url = start_mock().await;
    let client = ClickhouseClient::new(DatasourceSettings {
        basic_auth_enabled: true,
        basic_auth_user: "alice".to_string(),
        secure_data: SecureData {
            basic_auth_password: Some("hunter2".to_string()),
            ..Default::default()
        },
        ..settings(&url)
    });

    let response = client.query((), "SELECT currentUser()").await.unwrap();
    assert_eq!(response.body, "alice\n");
}

#[tokio::test]
async fn header_auth_sends_user_and_stored_key() {
    let url = start_mock().await;
    let client = ClickhouseClient::new(DatasourceSettings {
        use_cloud_authorization: true,
        x_header_user: "bob".to_string(),
        x_header_key: "plain-key".to_string(),
        secure_data: SecureData {
            x_header_key: Some("stored-key".to_string()),
            ..Default::default()
        },
        ..settings(&url)
    });

    let user = client.query((), "SELECT currentUser()").await.unwrap();
    assert_eq!(user.body, "bob\n");
    let key = client.query((), "SELECT currentKey()").await.unwrap();
    assert_eq!(key.body, "stored-key\n");
}

#[tokio::test]
async fn basic_auth_wins_when_both_modes_are_enabled() {
    let url = start_mock().await;
    let client = ClickhouseClient::new(DatasourceSettings {
        basic_auth_enabled: true,
        basic_auth_user: "alice".to_string(),
        use_cloud_authorization: true,
        x_header_user: "bob".to_string(),
        secure_data: SecureData {
            basic_auth_password: Some("hunter2".to_string()),
            ..Default::default()
        },
        ..settings(&url)
    });

    let response = client.query((), "SELECT currentUser()").await.unwrap();
    assert_eq!(response.body, "alice\n");
}

#[tokio::test]
async fn incomplete_tls_identity_never_reaches_the_wire() {
    // An unroutable endpoint: if the client tried to connect, the test
    // would fail with a network error instead of a config error.
    let client = ClickhouseClient::new(DatasourceSettings {
        url: "https://192.0.2.1:8443".to_string(),
        secure_data: SecureData {
            tls_client_cert: Some("CERT".to_string()),
            ..Default::default()
        },
        ..Default::default()
    });

    let err = client.query((), "SELECT 1").await.unwrap_err();
    assert!(matches!(err, ClientError::Config(_)));
}

#[tokio::test]
async fn connection_refused_maps_to_network_error() {
    // Bind-then-drop guarantees nothing is listening on the port.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ClickhouseClient::new(settings(&format!("http://{addr}")));
    let err = client.query((), "SELECT 1").await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}

#[tokio::test]
async fn concurrent_queries_keep_their_contexts() {
    let url = start_mock().await;
    let client = ClickhouseClient::new(settings(&url));

    let calls = (0..16u32).map(|i| {
        let client = &client;
        async move { client.query(i, "SELECT 1").await.unwrap() }
    });
    for (i, response) in futures_util::future::join_all(calls).await.into_iter().enumerate() {
        assert_eq!(response.ctx, i as u32);
        assert_eq!(response.body, "1\n");
    }
}
