//! Google Maps client tests against a local stub server

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use spread_geocoder::services::{GoogleMapsClient, MapsError, MapsService};

type Seen = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

#[derive(Clone)]
struct Stub {
    seen: Seen,
    /// Response per endpoint: (HTTP status, raw body)
    replies: Arc<HashMap<&'static str, (StatusCode, String)>>,
}

async fn reply(stub: &Stub, endpoint: &'static str, params: HashMap<String, String>) -> impl IntoResponse {
    stub.seen.lock().unwrap().push((endpoint.to_string(), params));
    let (status, body) = stub
        .replies
        .get(endpoint)
        .cloned()
        .unwrap_or((StatusCode::NOT_FOUND, String::new()));
    (status, [("content-type", "application/json")], body)
}

/// Start a stub on an ephemeral port and return a client pointed at it
async fn start_stub(replies: Vec<(&'static str, StatusCode, Value)>) -> (GoogleMapsClient, Seen) {
    start_stub_raw(
        replies
            .into_iter()
            .map(|(endpoint, status, body)| (endpoint, status, body.to_string()))
            .collect(),
    )
    .await
}

async fn start_stub_raw(replies: Vec<(&'static str, StatusCode, String)>) -> (GoogleMapsClient, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        seen: Arc::clone(&seen),
        replies: Arc::new(replies.into_iter().map(|(e, s, b)| (e, (s, b))).collect()),
    };

    let app = Router::new()
        .route(
            "/geocode/json",
            get(|State(s): State<Stub>, Query(q): Query<HashMap<String, String>>| async move {
                reply(&s, "geocode", q).await
            }),
        )
        .route(
            "/place/findplacefromtext/json",
            get(|State(s): State<Stub>, Query(q): Query<HashMap<String, String>>| async move {
                reply(&s, "findplace", q).await
            }),
        )
        .route(
            "/place/details/json",
            get(|State(s): State<Stub>, Query(q): Query<HashMap<String, String>>| async move {
                reply(&s, "details", q).await
            }),
        )
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = GoogleMapsClient::with_base_url("test-key".to_string(), format!("http://{}", addr)).unwrap();
    (client, seen)
}

#[tokio::test]
async fn test_geocode_ok_returns_location() {
    let (client, seen) = start_stub(vec![(
        "geocode",
        StatusCode::OK,
        json!({
            "status": "OK",
            "results": [{"geometry": {"location": {"lat": 30.2672, "lng": -97.7431}}}]
        }),
    )])
    .await;

    let results = client.geocode("Austin, TX, USA").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].geometry.location.lat, 30.2672);
    assert_eq!(results[0].geometry.location.lng, -97.7431);

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].1.get("address").map(String::as_str), Some("Austin, TX, USA"));
    assert_eq!(seen[0].1.get("key").map(String::as_str), Some("test-key"));
}

#[tokio::test]
async fn test_geocode_zero_results_is_empty() {
    let (client, _) = start_stub(vec![(
        "geocode",
        StatusCode::OK,
        json!({"status": "ZERO_RESULTS", "results": []}),
    )])
    .await;

    assert!(client.geocode("nowhere").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_find_place_sends_text_query_and_fields() {
    let (client, seen) = start_stub(vec![(
        "findplace",
        StatusCode::OK,
        json!({
            "status": "OK",
            "candidates": [{"place_id": "abc", "formatted_address": "123 Main St"}]
        }),
    )])
    .await;

    let candidates = client.find_place("Acme Store in Austin, TX").await.unwrap();
    assert_eq!(candidates[0].place_id.as_deref(), Some("abc"));

    let seen = seen.lock().unwrap();
    let params = &seen[0].1;
    assert_eq!(params.get("input").map(String::as_str), Some("Acme Store in Austin, TX"));
    assert_eq!(params.get("inputtype").map(String::as_str), Some("textquery"));
    assert_eq!(
        params.get("fields").map(String::as_str),
        Some("place_id,formatted_address,opening_hours")
    );
}

#[tokio::test]
async fn test_place_details_ok_and_not_found() {
    let (client, seen) = start_stub(vec![(
        "details",
        StatusCode::OK,
        json!({
            "status": "OK",
            "result": {
                "formatted_phone_number": "(512) 555-0100",
                "website": "https://acme.example",
                "opening_hours": {"weekday_text": ["Monday: Closed"]}
            }
        }),
    )])
    .await;

    let details = client.place_details("abc").await.unwrap().unwrap();
    assert_eq!(details.website.as_deref(), Some("https://acme.example"));
    assert_eq!(
        seen.lock().unwrap()[0].1.get("fields").map(String::as_str),
        Some("formatted_address,address_component,formatted_phone_number,website,opening_hours")
    );

    let (client, _) = start_stub(vec![("details", StatusCode::OK, json!({"status": "NOT_FOUND"}))]).await;
    assert!(client.place_details("gone").await.unwrap().is_none());
}

#[tokio::test]
async fn test_request_denied_is_api_error() {
    let (client, _) = start_stub(vec![(
        "findplace",
        StatusCode::OK,
        json!({"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}),
    )])
    .await;

    match client.find_place("anything").await {
        Err(MapsError::Api { status, message }) => {
            assert_eq!(status, "REQUEST_DENIED");
            assert_eq!(message, "The provided API key is invalid.");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_error_status() {
    let (client, _) = start_stub(vec![(
        "geocode",
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "boom"}),
    )])
    .await;

    let err = client.geocode("Austin").await.unwrap_err();
    assert!(matches!(err, MapsError::Http(500, _)));
    assert!(err.is_recognized());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let (client, _) = start_stub_raw(vec![("geocode", StatusCode::OK, "not json".to_string())]).await;

    let err = client.geocode("Austin").await.unwrap_err();
    assert!(matches!(err, MapsError::Parse(_)));
    assert!(!err.is_recognized());
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    // Bind then drop to get a port with nothing listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GoogleMapsClient::with_base_url("k".to_string(), format!("http://{}", addr)).unwrap();
    let err = client.geocode("Austin").await.unwrap_err();
    assert!(matches!(err, MapsError::Transport(_)));
}
