//! # SlotBook API
//!
//! HTTP surface of the clinic booking service: public availability and
//! reservation endpoints, live availability streams, and the admin endpoints
//! for reviewing and cancelling appointments.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate requests into booking operations
//! - **Middleware**: Admin authentication and error mapping
//! - **Config**: Environment configuration
//!
//! The booking rules live in `slotbook-booking`; this crate only adapts them
//! to HTTP with Axum.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    http::{HeaderValue, StatusCode},
};
use eyre::{Result, WrapErr};
use slotbook_booking::{AdminDashboard, Notifier, RealTimeView, SlotReservationService};
use slotbook_core::clock::Clock;
use slotbook_db::AppointmentStore;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub reservations: SlotReservationService,
    pub view: RealTimeView,
    /// Live admin view; runs for the lifetime of the server.
    pub dashboard: AdminDashboard,
    pub store: Arc<dyn AppointmentStore>,
    pub admin_password_hash: Option<String>,
}

impl ApiState {
    /// Wires the booking components to `store` and starts the admin
    /// dashboard.
    pub async fn new(
        store: Arc<dyn AppointmentStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        admin_password_hash: Option<String>,
    ) -> Result<Self> {
        let mut dashboard = AdminDashboard::new(Arc::clone(&store), notifier);
        dashboard
            .start()
            .await
            .wrap_err("Failed to start the admin dashboard")?;

        Ok(Self {
            reservations: SlotReservationService::new(Arc::clone(&store), clock),
            view: RealTimeView::new(Arc::clone(&store)),
            dashboard,
            store,
            admin_password_hash,
        })
    }
}

/// Initializes the global tracing subscriber.
pub fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Builds the application router with all routes and layers.
pub fn build_router(state: Arc<ApiState>, config: &config::ApiConfig) -> Result<Router> {
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Public booking endpoints
        .merge(routes::availability::routes())
        .merge(routes::appointments::routes())
        // Admin endpoints
        .merge(routes::admin::routes())
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .wrap_err_with(|| format!("Invalid CORS origin '{}'", origin))
            })
            .collect::<Result<Vec<HeaderValue>>>()?;
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Request timeout; streams are only bounded until their headers are sent.
    let app = app.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout_error))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    Ok(app.layer(TraceLayer::new_for_http()))
}

async fn handle_timeout_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", err),
        )
    }
}

/// Starts the HTTP server
///
/// # Example
///
/// ```rust,no_run
/// # async fn run() -> eyre::Result<()> {
/// use std::sync::Arc;
/// use slotbook_api::{ApiState, config::ApiConfig, start_server};
/// use slotbook_booking::LogNotifier;
/// use slotbook_core::clock::SystemClock;
/// use slotbook_db::MemoryAppointmentStore;
///
/// let config = ApiConfig::from_env()?;
/// let state = ApiState::new(
///     Arc::new(MemoryAppointmentStore::new()),
///     Arc::new(SystemClock::default()),
///     Arc::new(LogNotifier),
///     config.admin_password_hash.clone(),
/// )
/// .await?;
/// start_server(config, state).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, state: ApiState) -> Result<()> {
    let app = build_router(Arc::new(state), &config)?;

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
