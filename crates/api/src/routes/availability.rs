use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/availability/:date",
            get(handlers::availability::get_availability),
        )
        .route(
            "/api/availability/:date/stream",
            get(handlers::availability::stream_availability),
        )
}
