use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{availability, booking, health, schedule, settings, sync};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Public availability
        .route("/api/availability/ghl", get(availability::get_ghl_availability))
        .route("/api/availability/month", get(availability::get_month_availability))

        // Booking flow
        .route("/api/calendar/book-slot", get(booking::get_day_slots).post(booking::create_booking))

        // Admin schedule & CRM settings
        .route("/api/admin/availability", get(schedule::get_schedule).put(schedule::update_schedule))
        .route("/api/admin/availability/reset", post(schedule::reset_schedule))
        .route("/api/admin/settings", get(settings::get_settings).put(settings::update_settings))

        // Admin sync repair
        .route("/api/admin/failed-syncs", get(sync::list_failed_syncs))
        .route("/api/admin/retry-failed-syncs", post(sync::retry_failed_syncs))
        .route("/api/admin/retry-single-sync", post(sync::retry_single_sync))

        // Scheduled sweep
        .route("/api/cron/sync-ghl", get(sync::cron_sweep))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
