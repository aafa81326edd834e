//! Integration tests for the HTTP booking client with Wiremock
//!
//! Exercises the client through the BookingService port the way the
//! controller uses it.

use chrono::{DateTime, Duration, TimeZone, Utc};
use onsite_booking::adapters::outbound::{HttpBookingConfig, HttpBookingService};
use onsite_booking::domain::ports::{BookingService, Clock, ServiceError};
use onsite_booking::domain::value_objects::{BookingField, BookingId, ResourceId};
use onsite_booking::{BookingRequest, CheckinToken, MembershipId};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 3, 18, 45, 12).unwrap()
}

fn client(server: &MockServer) -> HttpBookingService {
    HttpBookingService::new(
        HttpBookingConfig {
            api_url: format!("{}/", server.uri()),
            access_token: "tok".to_string(),
            ..HttpBookingConfig::default()
        },
        Arc::new(FixedClock(now())),
    )
    .unwrap()
}

/// Test that the token travels as a query parameter on every call
#[tokio::test]
async fn test_access_token_on_every_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/check_in_tokens/55"))
        .and(query_param("access_token", "tok"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "membership": {"id": "m-1", "name": "ignored"}
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/bookings/3/"))
        .and(query_param("access_token", "tok"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let id = client
        .lookup_identity(&CheckinToken::from("55"))
        .await
        .unwrap();
    assert_eq!(id, MembershipId::new("m-1"));
    client.delete_booking(&BookingId::new("3")).await.unwrap();
}

/// Test booking lifecycle calls against one mock portal
#[tokio::test]
async fn test_create_then_shorten() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/resources/4/bookings"))
        .and(body_partial_json(serde_json::json!({
            "membership_id": "42",
            "from": "2024/11/03 18:45:00 +0000",
            "to": "2024/11/03 19:15:00 +0000"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 900,
            "membership_id": 42,
            "from": "2024/11/03 18:45:00 +0000",
            "to": "2024/11/03 19:15:00 +0000",
            "title": "On-site Booking",
            "comments": "badge"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/bookings/900/"))
        .and(body_partial_json(serde_json::json!({"to": "2024/11/03 19:02:00 +0000"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 900,
            "membership_id": 42,
            "from": "2024/11/03 18:45:00 +0000",
            "to": "2024/11/03 19:02:00 +0000"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let request = BookingRequest::starting_at(
        MembershipId::new("42"),
        now(),
        Duration::minutes(30),
        "On-site Booking".to_string(),
        "badge".to_string(),
    );
    let created = client
        .create_booking(&ResourceId::new("4"), &request)
        .await
        .unwrap();
    assert_eq!(created.id, BookingId::new("900"));
    assert_eq!(created.title, "On-site Booking");

    let shortened = client
        .update_booking(&created.id, BookingField::EndTime, now() + Duration::minutes(17))
        .await
        .unwrap();
    assert_eq!(
        shortened.end_time,
        Utc.with_ymd_and_hms(2024, 11, 3, 19, 2, 0).unwrap()
    );
    assert_eq!(shortened.start_time, created.start_time);
}

/// Test that offsets other than UTC are normalized
#[tokio::test]
async fn test_range_query_normalizes_offsets() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/resources/4/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "id": 1,
            "membership_id": 8,
            "from": "2024/11/03 19:30:00 +0100",
            "to": "2024/11/03 20:30:00 +0100"
        }])))
        .mount(&server)
        .await;

    let bookings = client(&server)
        .get_bookings_in_range(&ResourceId::new("4"), now(), now() + Duration::minutes(31))
        .await
        .unwrap();

    assert_eq!(bookings.len(), 1);
    assert_eq!(
        bookings[0].start_time,
        Utc.with_ymd_and_hms(2024, 11, 3, 18, 30, 0).unwrap()
    );
}

/// Test that a range response with a broken booking fails as a whole
#[tokio::test]
async fn test_range_query_malformed_booking() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/resources/4/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "id": 1,
            "membership_id": 8,
            "from": "3 Nov 2024",
            "to": "2024/11/03 20:30:00 +0000"
        }])))
        .mount(&server)
        .await;

    let result = client(&server)
        .get_current_booking(&ResourceId::new("4"))
        .await;
    assert!(matches!(result, Err(ServiceError::Malformed(_))));
}

/// Test status mapping for rejected and conflicting mutations
#[tokio::test]
async fn test_error_status_mapping() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/bookings/5/"))
        .respond_with(ResponseTemplate::new(422).set_body_string("to before from"))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/bookings/5/"))
        .respond_with(ResponseTemplate::new(409).set_body_string("event booking"))
        .mount(&server)
        .await;

    let client = client(&server);
    let update = client
        .update_booking(&BookingId::new("5"), BookingField::EndTime, now())
        .await;
    assert_eq!(
        update.unwrap_err(),
        ServiceError::Rejected {
            status: 422,
            message: "to before from".to_string()
        }
    );

    let delete = client.delete_booking(&BookingId::new("5")).await;
    assert_eq!(
        delete.unwrap_err(),
        ServiceError::Conflict("event booking".to_string())
    );
}
