use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers::admin};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/admin/appointments", get(admin::list_appointments))
        .route(
            "/api/admin/appointments/stream",
            get(admin::stream_appointments),
        )
        .route("/api/admin/summary", get(admin::summary))
        .route(
            "/api/admin/appointments/:id/accept",
            post(admin::accept_appointment),
        )
        .route(
            "/api/admin/appointments/:id/reject",
            post(admin::reject_appointment),
        )
        .route(
            "/api/admin/appointments/:id",
            delete(admin::cancel_appointment),
        )
        .route(
            "/api/admin/appointments/:id/history",
            get(admin::appointment_history),
        )
}
