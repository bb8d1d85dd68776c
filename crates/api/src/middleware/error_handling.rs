//! # Error Handling Middleware
//!
//! Maps booking errors to HTTP status codes and a JSON body of the form
//! `{"error": "...", "guidance": "try_different_slot" | "try_again" | "fix_input"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use slotbook_core::errors::BookingError;
use tracing::error;

/// Wraps a [`BookingError`] so handlers can return it directly.
///
/// # Example
///
/// ```
/// use axum::Json;
/// use slotbook_api::middleware::error_handling::AppError;
/// use slotbook_core::models::appointment::AppointmentId;
///
/// async fn handler(id: String) -> Result<Json<String>, AppError> {
///     let id: AppointmentId = id.parse()?;
///     Ok(Json(id.to_string()))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub BookingError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            BookingError::AlreadyBooked(_) => StatusCode::CONFLICT,
            BookingError::InvalidTransition { .. } => StatusCode::CONFLICT,
            BookingError::Authentication(_) => StatusCode::UNAUTHORIZED,
            BookingError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let BookingError::Store(report) = &self.0 {
            error!("Store failure: {:?}", report);
        }

        let body = Json(json!({
            "error": self.0.to_string(),
            "guidance": self.0.guidance(),
        }));

        (status, body).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(BookingError::Store(err))
    }
}
