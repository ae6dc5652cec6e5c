//! Myra repository behavior against a local mock API
//!
//! Constraints verified:
//! - Every request is signed and hits the documented path
//! - Listing failures are errors, update rejections are outcomes
//! - Updates send the full record, retargeted
//! - Dry-run never sends an update

use myradyn_core::Error;
use myradyn_core::traits::{DnsRecord, ListOptions, RecordRepository, RecordType, UpdateOutcome};
use myradyn_provider_myra::{Credentials, MyraProvider, api_base_url};
use serde_json::json;
use std::net::{IpAddr, TcpListener};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, header_exists, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_PATH: &str = "/en/rapi/dnsRecords/example.com/1";
const UPDATE_PATH: &str = "/en/rapi/dnsRecords/example.com";

fn provider(server: &MockServer, dry_run: bool) -> MyraProvider {
    MyraProvider::new(
        Credentials::new("test-key", "test-secret"),
        api_base_url(&server.uri()).unwrap(),
        "en",
        Duration::from_secs(5),
        dry_run,
    )
    .unwrap()
}

fn record_json(id: i64, name: &str, value: &str) -> serde_json::Value {
    json!({
        "objectType": "DnsRecordVO",
        "id": id,
        "modified": "2024-01-01T00:00:00+0100",
        "created": "2023-01-01T00:00:00+0100",
        "name": name,
        "value": value,
        "priority": 0,
        "ttl": 300,
        "recordType": "A",
        "active": true,
        "enabled": true,
        "paused": false,
        "upstreamOptions": null,
        "alternativeCname": "",
        "caaFlags": 0,
        "comment": "",
        "sslCertTemplate": "keep-me"
    })
}

fn record(id: i64, name: &str, value: &str) -> DnsRecord {
    serde_json::from_value(record_json(id, name, value)).unwrap()
}

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[tokio::test]
async fn list_sends_signed_filtered_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("activeOnly", "true"))
        .and(query_param("pageSize", "1000"))
        .and(query_param("recordTypes", "A,AAAA"))
        .and(header("content-type", "application/json"))
        .and(header_exists("date"))
        .and(header_regex("authorization", "^MYRA test-key:[A-Za-z0-9+/]+=*$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "list": [record_json(1, "www", "198.51.100.1"), record_json(2, "mail", "198.51.100.1")],
            "page": 1,
            "count": 2,
            "pageSize": 1000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = provider(&server, false)
        .list("example.com", &ListOptions::default())
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "www");
    assert_eq!(records[0].extra["sslCertTemplate"], "keep-me");
}

#[tokio::test]
async fn list_accepts_null_fields() {
    let server = MockServer::start().await;
    let mut with_nulls = record_json(3, "www", "198.51.100.1");
    with_nulls["comment"] = json!(null);
    with_nulls["alternativeCname"] = json!(null);
    with_nulls["priority"] = json!(null);
    with_nulls["modified"] = json!(null);

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "list": [with_nulls, record_json(4, "mail", "198.51.100.1")],
            "page": 1,
            "count": 2,
            "pageSize": 1000
        })))
        .mount(&server)
        .await;

    let records = provider(&server, false)
        .list("example.com", &ListOptions::default())
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, 3);
    assert_eq!(records[0].comment, "");
    assert_eq!(records[0].alternative_cname, "");
    assert_eq!(records[0].priority, 0);
    assert_eq!(records[1].name, "mail");
}

#[tokio::test]
async fn list_truncated_page_still_returns_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("pageSize", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "list": [record_json(1, "www", "198.51.100.1")],
            "page": 1,
            "count": 5,
            "pageSize": 1
        })))
        .mount(&server)
        .await;

    let records = provider(&server, false)
        .list("example.com", &ListOptions::address_records(1))
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn list_server_error_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = provider(&server, false)
        .list("example.com", &ListOptions::default())
        .await
        .unwrap_err();

    match err {
        Error::Fetch { domain, message } => {
            assert_eq!(domain, "example.com");
            assert!(message.contains("503"), "got {message}");
            assert!(message.contains("maintenance"));
        }
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn list_error_flag_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": true, "list": null})))
        .mount(&server)
        .await;

    let result = provider(&server, false)
        .list("example.com", &ListOptions::default())
        .await;

    assert!(matches!(result, Err(Error::Fetch { .. })));
}

#[tokio::test]
async fn list_malformed_body_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = provider(&server, false)
        .list("example.com", &ListOptions::default())
        .await;

    assert!(matches!(result, Err(Error::Fetch { .. })));
}

#[tokio::test]
async fn update_posts_retargeted_record() {
    let server = MockServer::start().await;
    let mut echoed = record_json(7, "www", "2001:db8::7");
    echoed["recordType"] = json!("AAAA");

    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .and(header_regex("authorization", "^MYRA test-key:"))
        .and(body_partial_json(json!({
            "id": 7,
            "name": "www",
            "value": "2001:db8::7",
            "recordType": "AAAA",
            "ttl": 300,
            "sslCertTemplate": "keep-me"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "violationList": [],
            "targetObject": [echoed]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = provider(&server, false)
        .update("example.com", record(7, "www", "198.51.100.1"), ip("2001:db8::7"))
        .await
        .unwrap();

    match outcome {
        UpdateOutcome::Updated { record: Some(r) } => {
            assert_eq!(r.value, "2001:db8::7");
            assert_eq!(r.record_type, RecordType::Aaaa);
        }
        other => panic!("expected update with echo, got {other:?}"),
    }

    let requests = server.received_requests().await.unwrap();
    let sent: DnsRecord = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(sent.comment.starts_with("myra-dyn update from 198.51.100.1 to 2001:db8::7 at "));
}

#[tokio::test]
async fn update_rejection_carries_violations() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": true,
            "violationList": [{"path": "value", "message": "address not allowed"}],
            "targetObject": null
        })))
        .mount(&server)
        .await;

    let outcome = provider(&server, false)
        .update("example.com", record(7, "www", "198.51.100.1"), ip("203.0.113.7"))
        .await
        .unwrap();

    match outcome {
        UpdateOutcome::Rejected { violations } => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].path, "value");
            assert_eq!(violations[0].message, "address not allowed");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn update_non_success_status_is_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("signature mismatch"))
        .mount(&server)
        .await;

    let outcome = provider(&server, false)
        .update("example.com", record(7, "www", "198.51.100.1"), ip("203.0.113.7"))
        .await
        .unwrap();

    match outcome {
        UpdateOutcome::Rejected { violations } => {
            assert_eq!(violations.len(), 1);
            assert!(violations[0].message.contains("403"));
            assert!(violations[0].message.contains("signature mismatch"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn update_unparseable_success_is_update_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider(&server, false)
        .update("example.com", record(7, "www", "198.51.100.1"), ip("203.0.113.7"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Update { ref name, .. } if name == "www"), "got {err:?}");
}

#[tokio::test]
async fn update_transport_failure_is_update_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let p = MyraProvider::new(
        Credentials::new("test-key", "test-secret"),
        api_base_url(&format!("http://127.0.0.1:{port}")).unwrap(),
        "en",
        Duration::from_secs(2),
        false,
    )
    .unwrap();

    let err = p
        .update("example.com", record(7, "www", "198.51.100.1"), ip("203.0.113.7"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Update { ref message, .. } if message.contains("HTTP request failed")),
        "got {err:?}"
    );
}

#[tokio::test]
async fn dry_run_lists_but_never_posts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "list": [record_json(1, "www", "198.51.100.1")],
            "page": 1,
            "count": 1,
            "pageSize": 1000
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let p = provider(&server, true);
    let records = p.list("example.com", &ListOptions::default()).await.unwrap();
    let outcome = p
        .update("example.com", records[0].clone(), ip("203.0.113.7"))
        .await
        .unwrap();

    match outcome {
        UpdateOutcome::Updated { record: Some(r) } => assert_eq!(r.value, "203.0.113.7"),
        other => panic!("expected simulated update, got {other:?}"),
    }
}
