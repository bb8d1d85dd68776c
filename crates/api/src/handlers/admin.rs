//! # Admin Handlers
//!
//! Every handler here requires [`AdminAuth`]. Transitions go through the
//! shared [`AdminDashboard`](slotbook_booking::AdminDashboard), so failures
//! are logged in one place.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use eyre::eyre;
use futures_util::Stream;
use serde::Deserialize;
use slotbook_booking::{StatusCounts, StatusFilter, TransitionOutcome};
use slotbook_core::{
    errors::BookingError,
    models::appointment::{Appointment, AppointmentId},
    transitions::{Confirmation, Transition},
};
use slotbook_db::AppointmentQuery;
use tokio::sync::mpsc;

use crate::{
    ApiState,
    handlers::subscription_events,
    middleware::{auth::AdminAuth, error_handling::AppError},
};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `pending` (default), `accepted` or `all`
    pub status: Option<StatusFilter>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelQuery {
    pub confirm: Option<bool>,
}

/// Lists appointments, ordered by date and time
///
/// # Endpoint
///
/// ```text
/// GET /api/admin/appointments?status=pending|accepted|all
/// ```
pub async fn list_appointments(
    _: AdminAuth,
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let filter = query.status.unwrap_or_default();
    let appointments = state.store.list(AppointmentQuery::all()).await?;

    Ok(Json(
        appointments
            .into_iter()
            .filter(|a| filter.matches(a))
            .collect(),
    ))
}

/// Counts per status from the live dashboard
///
/// # Endpoint
///
/// ```text
/// GET /api/admin/summary
/// ```
pub async fn summary(_: AdminAuth, State(state): State<Arc<ApiState>>) -> Json<StatusCounts> {
    Json(state.dashboard.counts())
}

/// Streams every appointment as an `appointments` event on each change
///
/// # Endpoint
///
/// ```text
/// GET /api/admin/appointments/stream
/// ```
pub async fn stream_appointments(
    _: AdminAuth,
    State(state): State<Arc<ApiState>>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let (tx, rx) = mpsc::unbounded_channel();
    let subscription = state
        .view
        .subscribe_all(move |appointments| {
            let _ = tx.send(appointments);
        })
        .await?;

    let events = subscription_events("appointments", rx, subscription);

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// ```text
/// POST /api/admin/appointments/{id}/accept
/// ```
pub async fn accept_appointment(
    _: AdminAuth,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let id: AppointmentId = id.parse()?;
    updated(state.dashboard.accept(id).await?)
}

/// ```text
/// POST /api/admin/appointments/{id}/reject
/// ```
pub async fn reject_appointment(
    _: AdminAuth,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let id: AppointmentId = id.parse()?;
    updated(state.dashboard.reject(id).await?)
}

/// Cancels an accepted appointment, freeing its slot
///
/// # Endpoint
///
/// ```text
/// DELETE /api/admin/appointments/{id}?confirm=true
/// ```
///
/// Without `confirm=true` nothing is deleted and the response is a 400.
pub async fn cancel_appointment(
    _: AdminAuth,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Query(query): Query<CancelQuery>,
) -> Result<StatusCode, AppError> {
    let id: AppointmentId = id.parse()?;
    let confirmation = Confirmation::from(query.confirm.unwrap_or(false));

    match state
        .dashboard
        .apply(id, Transition::Cancel, confirmation)
        .await?
    {
        TransitionOutcome::Deleted(_) => Ok(StatusCode::NO_CONTENT),
        TransitionOutcome::Declined => Err(BookingError::invalid_input(
            "Cancellation must be confirmed with confirm=true",
        )
        .into()),
        TransitionOutcome::Updated(appointment) => {
            Err(eyre!("Cancel of {} left a record behind", appointment.id).into())
        }
    }
}

/// Rejected records previously replaced at this slot, oldest first
///
/// # Endpoint
///
/// ```text
/// GET /api/admin/appointments/{id}/history
/// ```
pub async fn appointment_history(
    _: AdminAuth,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let id: AppointmentId = id.parse()?;
    Ok(Json(state.store.history(id).await?))
}

fn updated(outcome: TransitionOutcome) -> Result<Json<Appointment>, AppError> {
    match outcome {
        TransitionOutcome::Updated(appointment) => Ok(Json(appointment)),
        other => Err(eyre!("Unexpected transition outcome {:?}", other).into()),
    }
}
