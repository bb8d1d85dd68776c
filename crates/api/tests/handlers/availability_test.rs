use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::test_utils::{TestContext, booking};

#[tokio::test]
async fn test_weekday_availability() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/api/availability/2024-06-10").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["date"], "2024-06-10");
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 12);
    assert_eq!(slots[0], json!({ "time": "08:00", "occupancy": "free" }));
    assert_eq!(slots[11], json!({ "time": "19:00", "occupancy": "free" }));
}

#[tokio::test]
async fn test_saturday_and_sunday() {
    let ctx = TestContext::new().await;

    let saturday: Value = ctx.server.get("/api/availability/2024-06-15").await.json();
    assert_eq!(saturday["slots"].as_array().unwrap().len(), 6);

    let sunday: Value = ctx.server.get("/api/availability/2024-06-16").await.json();
    assert_eq!(sunday["slots"], json!([]));
}

#[tokio::test]
async fn test_reservation_shows_as_pending() {
    let ctx = TestContext::new().await;
    ctx.server
        .post("/api/appointments")
        .json(&booking("2024-06-10", "09:00", "Ana"))
        .await
        .assert_status(StatusCode::CREATED);

    let body: Value = ctx.server.get("/api/availability/2024-06-10").await.json();

    assert_eq!(body["slots"][1], json!({ "time": "09:00", "occupancy": "pending" }));
}

#[tokio::test]
async fn test_malformed_date() {
    let ctx = TestContext::new().await;

    for path in [
        "/api/availability/10-06-2024",
        "/api/availability/2024-02-30/stream",
    ] {
        let response = ctx.server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", path);
        let body: Value = response.json();
        assert_eq!(body["guidance"], "fix_input");
    }
}

#[tokio::test]
async fn test_stream_pushes_current_state_then_changes() {
    let ctx = TestContext::new().await;
    let (status, reader) = ctx
        .open_stream("/api/availability/2024-06-10/stream", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let mut events = reader.unwrap();

    let (name, first) = events.next_event().await;
    assert_eq!(name, "slots");
    assert_eq!(first["date"], "2024-06-10");
    assert_eq!(first["slots"][1], json!({ "time": "09:00", "occupancy": "free" }));

    ctx.server
        .post("/api/appointments")
        .json(&booking("2024-06-10", "09:00", "Ana"))
        .await
        .assert_status(StatusCode::CREATED);

    let (name, second) = events.next_event().await;
    assert_eq!(name, "slots");
    assert_eq!(second["slots"][1], json!({ "time": "09:00", "occupancy": "pending" }));
}
