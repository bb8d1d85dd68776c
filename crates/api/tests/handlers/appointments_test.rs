use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

use crate::test_utils::{TestContext, booking};

#[tokio::test]
async fn test_create_appointment() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/appointments")
        .json(&json!({
            "date": "2024-06-10",
            "time": "09:00",
            "name": " Ana ",
            "phone": "555-0100",
            "reason": "checkup",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["id"], "2024-06-10_09:00");
    assert_eq!(body["date"], "2024-06-10");
    assert_eq!(body["time"], "09:00");
    assert_eq!(body["name"], "Ana");
    assert_eq!(body["reason"], "checkup");
    assert_eq!(body["status"], "pending");
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn test_taken_slot_is_a_conflict() {
    let ctx = TestContext::new().await;
    ctx.server
        .post("/api/appointments")
        .json(&booking("2024-06-10", "09:00", "Ana"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = ctx
        .server
        .post("/api/appointments")
        .json(&booking("2024-06-10", "09:00", "Ben"))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["guidance"], "try_different_slot");
}

#[rstest]
#[case::closing_time("2024-06-10", "20:00", "Ana")]
#[case::sunday("2024-06-16", "10:00", "Ana")]
#[case::blank_name("2024-06-10", "10:00", "  ")]
#[case::past("2024-06-07", "10:00", "Ana")]
#[case::bad_time("2024-06-10", "ten", "Ana")]
#[tokio::test]
async fn test_invalid_reservations(#[case] date: &str, #[case] time: &str, #[case] name: &str) {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/appointments")
        .json(&booking(date, time, name))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["guidance"], "fix_input");
}
