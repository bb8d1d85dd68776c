use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use slotbook_core::models::appointment::{Appointment, ReservationRequest};

use crate::{ApiState, middleware::error_handling::AppError};

/// Reserves a slot
///
/// # Endpoint
///
/// ```text
/// POST /api/appointments
/// ```
///
/// # Request Body
///
/// ```json
/// {
///   "date": "2024-06-10",
///   "time": "09:00",
///   "name": "Ana",
///   "phone": "555-0100",
///   "reason": "checkup"
/// }
/// ```
///
/// Returns the pending record with 201, or 409 with guidance
/// `try_different_slot` when the slot is already held.
pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ReservationRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment = state.reservations.reserve(&request).await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}
