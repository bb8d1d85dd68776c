use std::sync::Arc;

use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
use axum_test::TestServer;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;
use slotbook_api::{
    ApiState, build_router,
    config::ApiConfig,
    middleware::{
        auth::{hash_password, verify_password},
        error_handling::AppError,
    },
};
use slotbook_booking::NoNotifier;
use slotbook_core::{
    clock::FixedClock, errors::BookingError, models::appointment::AppointmentStatus,
    transitions::Transition,
};
use slotbook_db::mock::MockAppointmentStore;
use tokio::sync::broadcast;

use crate::test_utils::{TestContext, booking, today};

#[rstest]
#[case::not_found(BookingError::NotFound("x".into()), StatusCode::NOT_FOUND, "fix_input")]
#[case::invalid_input(BookingError::InvalidInput("x".into()), StatusCode::BAD_REQUEST, "fix_input")]
#[case::already_booked(BookingError::AlreadyBooked("x".into()), StatusCode::CONFLICT, "try_different_slot")]
#[case::invalid_transition(
    BookingError::InvalidTransition { from: AppointmentStatus::Rejected, transition: Transition::Accept },
    StatusCode::CONFLICT,
    "fix_input"
)]
#[case::authentication(BookingError::Authentication("x".into()), StatusCode::UNAUTHORIZED, "fix_input")]
#[case::store(BookingError::Store(eyre::eyre!("connection refused")), StatusCode::SERVICE_UNAVAILABLE, "try_again")]
#[tokio::test]
async fn test_error_responses(
    #[case] error: BookingError,
    #[case] status: StatusCode,
    #[case] guidance: &str,
) {
    let message = error.to_string();

    let response = AppError(error).into_response();

    assert_eq!(response.status(), status);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], message);
    assert_eq!(body["guidance"], guidance);
}

#[test]
fn test_password_hash_round_trip() {
    let hash = hash_password("front-desk").unwrap();

    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(&hash, "front-desk").unwrap());
    assert!(!verify_password(&hash, "front-desk ").unwrap());
}

#[test]
fn test_malformed_hash_is_an_error() {
    assert!(verify_password("not-a-phc-string", "anything").is_err());
}

#[tokio::test]
async fn test_health_and_version() {
    let ctx = TestContext::new().await;

    let health: Value = ctx.server.get("/health").await.json();
    assert_eq!(health["status"], "ok");

    let version: Value = ctx.server.get("/version").await.json();
    assert_eq!(version["version"], env!("CARGO_PKG_VERSION"));
}

#[test_log::test(tokio::test)]
async fn test_store_outage_is_service_unavailable() {
    let (changes, _) = broadcast::channel(16);
    let feed = changes.clone();
    let mut store = MockAppointmentStore::new();
    store.expect_changes().returning(move || feed.subscribe());
    store.expect_list().returning(|_| Ok(vec![]));
    store
        .expect_create_unless_occupied()
        .times(1)
        .returning(|_| Err(eyre::eyre!("connection refused")));

    let state = ApiState::new(
        Arc::new(store),
        Arc::new(FixedClock::on(today())),
        Arc::new(NoNotifier),
        None,
    )
    .await
    .unwrap();
    let config = ApiConfig::from_lookup(|_| None).unwrap();
    let server = TestServer::new(build_router(Arc::new(state), &config).unwrap()).unwrap();

    let response = server
        .post("/api/appointments")
        .json(&booking("2024-06-10", "09:00", "Ana"))
        .await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["guidance"], "try_again");
}
