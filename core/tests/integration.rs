//! Full code lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every resource
//! method over real HTTP through `ReqwestTransport`. Validates request
//! building, dispatch and buffer decoding end-to-end.

use std::sync::Arc;
use std::time::Duration;

use cealloga_core::{
    ApiClient, ApiError, ClientConfig, CodeQuery, CodeRecord, CodeSubmission, ReqwestTransport,
};
use serde_json::json;
use url::Url;

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { mock_server::run(listener).await });
    format!("http://{addr}")
}

#[tokio::test(flavor = "multi_thread")]
async fn code_lifecycle() {
    // Step 1: start mock server on a random port.
    let host = start_server().await;
    let client = ApiClient::new(ClientConfig::new(&host)).unwrap();

    // Step 2: list, should be empty.
    let records: Vec<CodeRecord> = client
        .code()
        .list(&CodeQuery::new())
        .await
        .unwrap()
        .into_value()
        .unwrap();
    assert!(records.is_empty(), "expected empty list");

    // Step 3: validate a submission.
    let submission = CodeSubmission {
        name: "barchart".to_string(),
        service: "return colours;".to_string(),
    };
    let reply = client.code().validate(&submission).await.unwrap();
    assert_eq!(reply.status(), 200);
    let created: CodeRecord = reply.into_value().unwrap();
    assert_eq!(created.name, "barchart");
    assert!(!created.published);
    let id = created.id.clone();

    // Step 4: test-execute by id; the reply is an encoded buffer.
    let payload = json!({"labels": ["blue", "dearg é", "€"], "series": [1, 2]});
    let reply = client.cealloga().test(&id, &payload).await.unwrap();
    assert_eq!(reply.status(), 200);
    assert_eq!(reply.value, payload);

    // Step 5: executing by name before publishing is a 404 with a JSON body.
    let reply = client.cealloga().exec("barchart", &payload).await.unwrap();
    assert_eq!(reply.status(), 404);
    assert_eq!(reply.value["error"], "published service not found");
    let err = reply.error_for_status().unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Step 6: publish.
    let published: CodeRecord = client
        .code()
        .publish(&id)
        .await
        .unwrap()
        .into_value()
        .unwrap();
    assert!(published.published);

    // Step 7: execute by published name.
    let reply = client.cealloga().exec("barchart", &payload).await.unwrap();
    assert_eq!(reply.status(), 200);
    assert_eq!(reply.value["labels"][0], "blue");
    assert_eq!(reply.value["series"][0], 1);

    // Step 8: list published records by name.
    let records: Vec<CodeRecord> = client
        .code()
        .list(&CodeQuery::new().name("barchart").published(true))
        .await
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);

    // Step 9: unpublish by name.
    let reply = client.code().unpublish("barchart").await.unwrap();
    assert_eq!(reply.status(), 200);
    assert!(reply.value.is_object());

    // Step 10: unpublished list holds the record.
    let records: Vec<CodeRecord> = client
        .code()
        .list(&CodeQuery::new().name("barchart").published(false))
        .await
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(records.len(), 1);

    // Step 11: single record.
    let record: CodeRecord = client
        .code()
        .record(&id)
        .await
        .unwrap()
        .error_for_status()
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(record.id, id);
    assert!(!record.published);

    // Step 12: unknown record.
    let err = client
        .code()
        .record("missing")
        .await
        .unwrap()
        .error_for_status()
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_host_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(ClientConfig::new(&format!("http://{addr}"))).unwrap();
    let err = client.code().list(&CodeQuery::new()).await.unwrap_err();
    assert!(err.is_transport());
    assert!(err.response().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn cross_origin_endpoint_is_refused() {
    let host = start_server().await;
    let client = ApiClient::new(ClientConfig::new(&host)).unwrap();

    // Joined with the host this reads as userinfo, so the real host is example.com.
    let err = client
        .cealloga()
        .exec_at("@example.com/cealloga/barchart", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn non_json_error_body_keeps_response() {
    let host = start_server().await;
    let client = ApiClient::new(ClientConfig::new(&host)).unwrap();

    // The mock rejects a submission missing `service` with a plain-text 422.
    let err = client
        .code()
        .validate(&json!({"name": "barchart"}))
        .await
        .unwrap_err();
    assert!(err.is_parse());
    assert_eq!(err.response().map(|r| r.status), Some(422));
}

#[tokio::test(flavor = "multi_thread")]
async fn custom_reqwest_client_reaches_server() {
    let host = start_server().await;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let transport = ReqwestTransport::with_client(http).with_origin(&Url::parse(&host).unwrap());
    let client = ApiClient::with_transport(ClientConfig::new(&host), Arc::new(transport)).unwrap();

    let reply = client.code().list(&CodeQuery::new()).await.unwrap();
    assert_eq!(reply.status(), 200);
    assert_eq!(reply.value, json!([]));
}
