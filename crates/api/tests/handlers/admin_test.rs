use std::time::Duration;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::test_utils::{TestContext, admin_auth, bearer, booking};

async fn book(ctx: &TestContext, time: &str, name: &str) {
    ctx.server
        .post("/api/appointments")
        .json(&booking("2024-06-10", time, name))
        .await
        .assert_status(StatusCode::CREATED);
}

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_admin_requires_credentials() {
    let ctx = TestContext::new().await;

    let missing = ctx.server.get("/api/admin/appointments").await;
    assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);

    let (name, value) = bearer("guess");
    let wrong = ctx
        .server
        .get("/api/admin/appointments")
        .add_header(name, value)
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_disabled_without_password_hash() {
    let ctx = TestContext::without_admin().await;
    let (name, value) = admin_auth();

    let response = ctx
        .server
        .get("/api/admin/appointments")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let ctx = TestContext::new().await;
    book(&ctx, "10:00", "Ben").await;
    book(&ctx, "09:00", "Ana").await;
    let (name, value) = admin_auth();
    ctx.server
        .post("/api/admin/appointments/2024-06-10_10:00/accept")
        .add_header(name.clone(), value.clone())
        .await
        .assert_status_ok();

    let pending: Value = ctx
        .server
        .get("/api/admin/appointments")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert_eq!(names(&pending), vec!["Ana"]);

    let all: Value = ctx
        .server
        .get("/api/admin/appointments")
        .add_query_param("status", "all")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(names(&all), vec!["Ana", "Ben"]);
}

#[tokio::test]
async fn test_accept_twice_is_a_conflict() {
    let ctx = TestContext::new().await;
    book(&ctx, "09:00", "Ana").await;
    let (name, value) = admin_auth();

    let first = ctx
        .server
        .post("/api/admin/appointments/2024-06-10_09:00/accept")
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);
    assert_eq!(first.json::<Value>()["status"], "accepted");

    let second = ctx
        .server
        .post("/api/admin/appointments/2024-06-10_09:00/accept")
        .add_header(name, value)
        .await;
    assert_eq!(second.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let ctx = TestContext::new().await;
    let (name, value) = admin_auth();

    let unknown = ctx
        .server
        .post("/api/admin/appointments/2024-06-10_09:00/reject")
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

    let malformed = ctx
        .server
        .post("/api/admin/appointments/tomorrow/reject")
        .add_header(name, value)
        .await;
    assert_eq!(malformed.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancel_needs_confirmation() {
    let ctx = TestContext::new().await;
    book(&ctx, "11:00", "Ana").await;
    let (name, value) = admin_auth();
    ctx.server
        .post("/api/admin/appointments/2024-06-10_11:00/accept")
        .add_header(name.clone(), value.clone())
        .await
        .assert_status_ok();

    let unconfirmed = ctx
        .server
        .delete("/api/admin/appointments/2024-06-10_11:00")
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(unconfirmed.status_code(), StatusCode::BAD_REQUEST);

    let confirmed = ctx
        .server
        .delete("/api/admin/appointments/2024-06-10_11:00")
        .add_query_param("confirm", true)
        .add_header(name, value)
        .await;
    assert_eq!(confirmed.status_code(), StatusCode::NO_CONTENT);

    let availability: Value = ctx.server.get("/api/availability/2024-06-10").await.json();
    assert_eq!(availability["slots"][3]["occupancy"], "free");
}

#[tokio::test]
async fn test_rebooked_slot_keeps_history() {
    let ctx = TestContext::new().await;
    book(&ctx, "12:00", "Ana").await;
    let (name, value) = admin_auth();
    ctx.server
        .post("/api/admin/appointments/2024-06-10_12:00/reject")
        .add_header(name.clone(), value.clone())
        .await
        .assert_status_ok();
    book(&ctx, "12:00", "Ben").await;

    let history: Value = ctx
        .server
        .get("/api/admin/appointments/2024-06-10_12:00/history")
        .add_header(name, value)
        .await
        .json();

    assert_eq!(names(&history), vec!["Ana"]);
    assert_eq!(history[0]["status"], "rejected");
}

#[tokio::test]
async fn test_summary_follows_the_dashboard() {
    let ctx = TestContext::new().await;
    book(&ctx, "09:00", "Ana").await;
    book(&ctx, "10:00", "Ben").await;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while ctx.state.dashboard.counts().pending < 2 {
        assert!(tokio::time::Instant::now() < deadline, "dashboard never caught up");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let (name, value) = admin_auth();
    let summary: Value = ctx
        .server
        .get("/api/admin/summary")
        .add_header(name, value)
        .await
        .json();

    assert_eq!(summary["pending"], 2);
    assert_eq!(summary["accepted"], 0);
    assert_eq!(summary["all"], 2);
}

#[tokio::test]
async fn test_appointment_stream() {
    let ctx = TestContext::new().await;
    let path = "/api/admin/appointments/stream";

    let (status, _) = ctx.open_stream(path, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = ctx.open_stream(path, Some(bearer("guess"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, reader) = ctx.open_stream(path, Some(admin_auth())).await;
    assert_eq!(status, StatusCode::OK);
    let mut events = reader.unwrap();

    let (name, first) = events.next_event().await;
    assert_eq!(name, "appointments");
    assert_eq!(first, serde_json::json!([]));

    book(&ctx, "11:00", "Ana").await;

    let (name, second) = events.next_event().await;
    assert_eq!(name, "appointments");
    assert_eq!(names(&second), vec!["Ana"]);
    assert_eq!(second[0]["status"], "pending");
}
