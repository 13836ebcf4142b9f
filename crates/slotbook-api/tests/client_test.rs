#![allow(clippy::unwrap_used)]
// Integration tests for `BookingClient` using wiremock.

use chrono::{DateTime, NaiveDate, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use slotbook_api::{BookingClient, BookingPayload, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BookingClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/exec", server.uri())).unwrap();
    let client = BookingClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 3, 4).unwrap()
}

fn payload() -> BookingPayload {
    BookingPayload {
        name: "Ada Lovelace".into(),
        address: "12 Analytical Way".into(),
        phone: "+15551234567".into(),
        date: date(),
        day: "Monday".into(),
        time_slot: "09:20 - 10:00".into(),
        test_type: "B".into(),
        timestamp: DateTime::parse_from_rfc3339("2030-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc),
    }
}

// ── Availability ────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_bookings_success() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/exec"))
        .and(query_param("action", "getBookings"))
        .and(query_param("date", "2030-03-04"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "bookedSlots": ["08:00 - 08:40", "09:20 - 10:00"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let booked = client.get_bookings(date()).await.unwrap();
    assert_eq!(booked, vec!["08:00 - 08:40", "09:20 - 10:00"]);
}

#[tokio::test]
async fn test_get_bookings_missing_list_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(query_param("action", "getBookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let booked = client.get_bookings(date()).await.unwrap();
    assert!(booked.is_empty());
}

#[tokio::test]
async fn test_get_bookings_failure_flag() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(query_param("action", "getBookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Sheet not found"
        })))
        .mount(&server)
        .await;

    let err = client.get_bookings(date()).await.unwrap_err();
    match err {
        Error::Remote { message } => assert_eq!(message, "Sheet not found"),
        other => panic!("expected Remote error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_get_bookings_failure_flag_without_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;

    let err = client.get_bookings(date()).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to load booked slots");
}

#[tokio::test]
async fn test_get_bookings_http_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client.get_bookings(date()).await.unwrap_err();
    assert!(
        matches!(err, Error::Http { status: 500, .. }),
        "expected Http error, got: {err:?}"
    );
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_get_bookings_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client.get_bookings(date()).await.unwrap_err();
    assert!(
        matches!(err, Error::Deserialization { .. }),
        "expected Deserialization error, got: {err:?}"
    );
}

// ── Submission ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_submit_posts_json_body() {
    let (server, client) = setup().await;

    let expected_body = serde_json::to_value(payload()).unwrap();

    Mock::given(method("POST"))
        .and(path("/exec"))
        .and(header("content-type", "application/json"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "bookingId": "B123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.submit(&payload()).await.unwrap();
    assert!(resp.success);
    assert_eq!(resp.booking_id.as_deref(), Some("B123"));
}

#[tokio::test]
async fn test_submit_returns_server_rejection() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Slot already booked"
        })))
        .mount(&server)
        .await;

    let resp = client.submit(&payload()).await.unwrap();
    assert!(!resp.success);
    assert_eq!(resp.failure_message(), "Slot already booked");
}

#[tokio::test]
async fn test_submit_decodes_payload_on_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "success": false,
            "message": "Duplicate"
        })))
        .mount(&server)
        .await;

    let resp = client.submit(&payload()).await.unwrap();
    assert_eq!(resp.failure_message(), "Duplicate");
}

#[tokio::test]
async fn test_submit_unparsable_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client.submit(&payload()).await.unwrap_err();
    assert!(
        matches!(err, Error::Http { status: 502, .. }),
        "expected Http error, got: {err:?}"
    );
}

#[tokio::test]
async fn test_submit_unreachable_endpoint() {
    // Port 9 (discard) on localhost is reliably closed in test environments.
    let base_url = Url::parse("http://127.0.0.1:9/exec").unwrap();
    let client = BookingClient::with_client(reqwest::Client::new(), base_url);

    let err = client.submit(&payload()).await.unwrap_err();
    assert!(
        matches!(err, Error::Transport(ref e) if e.is_connect()),
        "expected connection failure, got: {err:?}"
    );
}

#[tokio::test]
async fn test_submit_via_query_encodes_every_field() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/exec"))
        .and(query_param("action", "submit"))
        .and(query_param("name", "Ada Lovelace"))
        .and(query_param("address", "12 Analytical Way"))
        .and(query_param("phone", "+15551234567"))
        .and(query_param("date", "2030-03-04"))
        .and(query_param("day", "Monday"))
        .and(query_param("timeSlot", "09:20 - 10:00"))
        .and(query_param("testType", "B"))
        .and(query_param("timestamp", "2030-03-01T12:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "bookingId": "Q-77"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.submit_via_query(&payload()).await.unwrap();
    assert!(resp.success);
    assert_eq!(resp.booking_id.as_deref(), Some("Q-77"));
}
