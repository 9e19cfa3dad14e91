//! Tests for the HTTP remote store against a canned local server

use chrono::{DateTime, Utc};
use diario::domain::JournalEntry;
use diario::infrastructure::{RemoteBackend, RemoteConfig, RemoteStore};
use diario::DiarioError;

mod common;
use common::serve;

const ROW: &str = r#"[{"id":7,"title":"A","content":"B","author":"Esposa","created_at":"2025-03-10T12:00:00+00:00"}]"#;

fn store(url: &str) -> RemoteStore {
    RemoteStore::new(&RemoteConfig {
        url: url.to_string(),
        anon_key: "test-key".to_string(),
        timeout_secs: 5,
        ..RemoteConfig::default()
    })
    .unwrap()
}

#[test]
fn test_probe_sends_cheap_authenticated_read() {
    let (url, server) = serve(vec![(200, "[]")]);

    store(&url).probe().unwrap();

    let requests = server.join().unwrap();
    let request = requests[0].to_lowercase();
    assert!(request.starts_with("get /rest/v1/messages?select=id&limit=1 "));
    assert!(request.contains("apikey: test-key"));
    assert!(request.contains("authorization: bearer test-key"));
}

#[test]
fn test_list_orders_by_created_at() {
    let (url, server) = serve(vec![(200, ROW)]);

    let rows = store(&url).list().unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "7");
    assert_eq!(rows[0].title, "A");
    let requests = server.join().unwrap();
    assert!(requests[0].contains("order=created_at.desc"));
}

#[test]
fn test_create_posts_fields_and_returns_row() {
    let (url, server) = serve(vec![(201, ROW)]);

    let entry = store(&url).create("A", "B", "Esposa").unwrap();

    assert_eq!(entry.id, "7");
    let requests = server.join().unwrap();
    let request = requests[0].to_lowercase();
    assert!(request.starts_with("post /rest/v1/messages "));
    assert!(request.contains("prefer: return=representation"));
    assert!(requests[0].contains(r#""title":"A""#));
    assert!(requests[0].contains(r#""author":"Esposa""#));
}

#[test]
fn test_update_filters_by_id() {
    let (url, server) = serve(vec![(200, ROW)]);

    store(&url).update("7", "A", "B").unwrap();

    let requests = server.join().unwrap();
    assert!(requests[0].starts_with("PATCH /rest/v1/messages?id=eq.7 "));
    assert!(!requests[0].contains(r#""author""#));
}

#[test]
fn test_update_without_matching_row_is_not_found() {
    let (url, _server) = serve(vec![(200, "[]")]);

    match store(&url).update("99", "A", "B") {
        Err(DiarioError::NotFound(id)) => assert_eq!(id, "99"),
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_delete_reports_whether_a_row_matched() {
    let (url, _server) = serve(vec![(200, ROW), (200, "[]")]);
    let remote = store(&url);

    assert!(remote.delete("7").unwrap());
    assert!(!remote.delete("7").unwrap());
}

#[test]
fn test_insert_all_keeps_ids_and_timestamps() {
    let (url, server) = serve(vec![(201, "")]);
    let created_at: DateTime<Utc> = "2025-03-10T12:00:00Z".parse().unwrap();
    let entries = vec![JournalEntry::new("1741608000000", "A", "B", "Esposa", created_at)];

    store(&url).insert_all(&entries).unwrap();

    let requests = server.join().unwrap();
    assert!(requests[0].contains(r#""id":"1741608000000""#));
    assert!(requests[0].contains(r#""created_at":"2025-03-10T12:00:00Z""#));
}

#[test]
fn test_error_status_is_connectivity_error() {
    let (url, _server) = serve(vec![(503, r#"{"message":"upstream down"}"#)]);

    match store(&url).list() {
        Err(DiarioError::Connectivity(msg)) => {
            assert!(msg.contains("503"));
            assert!(msg.contains("upstream down"));
        }
        other => panic!("Expected Connectivity, got {:?}", other),
    }
}

#[test]
fn test_malformed_body_is_parse_error() {
    let (url, _server) = serve(vec![(200, "<html>maintenance</html>")]);

    assert!(matches!(store(&url).list(), Err(DiarioError::Parse(_))));
}

#[test]
fn test_unreachable_server_is_connectivity_error() {
    // Bind then drop to get a port nobody listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let result = store(&format!("http://127.0.0.1:{}", port)).probe();
    assert!(matches!(result, Err(DiarioError::Connectivity(_))));
}
