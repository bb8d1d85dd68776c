//! # Availability Handlers
//!
//! Slot availability for a single date, either as a one-off read or as a
//! server-sent event stream that pushes a fresh slot list whenever a
//! reservation, transition or cancellation touches that date.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::NaiveDate;
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use slotbook_booking::reservation::availability;
use slotbook_core::models::{appointment::parse_date, slot::SlotAvailability};
use tokio::sync::mpsc;
use tracing::debug;

use crate::{ApiState, handlers::subscription_events, middleware::error_handling::AppError};

/// Every catalogue slot of a date with its occupancy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub date: NaiveDate,
    pub slots: Vec<SlotAvailability>,
}

/// Lists the slots of a date
///
/// # Endpoint
///
/// ```text
/// GET /api/availability/{date}
/// ```
///
/// Sundays yield an empty list; a malformed date is a 400.
pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    Path(date): Path<String>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let date = parse_date(&date)?;
    let slots = state.reservations.list_availability(date).await?;

    Ok(Json(AvailabilityResponse { date, slots }))
}

/// Streams the slots of a date
///
/// # Endpoint
///
/// ```text
/// GET /api/availability/{date}/stream
/// ```
///
/// The first `slots` event carries the current state; later ones follow
/// every change to the date. Closing the connection drops the subscription.
pub async fn stream_availability(
    State(state): State<Arc<ApiState>>,
    Path(date): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let date = parse_date(&date)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let subscription = state
        .view
        .subscribe(date, move |slots| {
            let _ = tx.send(AvailabilityResponse {
                date,
                slots: availability(date, &slots),
            });
        })
        .await?;
    debug!("Opened availability stream for {}", date);

    let events = subscription_events("slots", rx, subscription);

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
