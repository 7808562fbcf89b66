use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::RetrySingleRequest;
use crate::api::dtos::responses::{BookingSyncResponse, FailedSyncView, GhlSyncStatus};
use crate::api::extractors::cron::CronAuth;
use crate::domain::services::sync::SyncTrigger;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

/// Unsynced and failed records, skipped ones included, for the admin repair
/// screen.
pub async fn list_failed_syncs(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_unsynced().await?;
    let views: Vec<FailedSyncView> = bookings.iter().map(FailedSyncView::from).collect();
    Ok(Json(views))
}

pub async fn retry_failed_syncs(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    info!("Manual bulk retry requested");
    let report = state.sync_service.retry_failed().await?;
    Ok(Json(report))
}

/// Retries one booking regardless of its retry count.
pub async fn retry_single_sync(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RetrySingleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .booking_repo
        .find_by_id(&payload.booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", payload.booking_id)))?;

    info!("Manual retry requested for booking {}", booking.id);
    let outcome = state
        .sync_service
        .sync_booking(&booking, SyncTrigger::ManualSingle)
        .await?;
    let ghl_sync = GhlSyncStatus::from_outcome(&outcome, &booking);

    let booking = state
        .booking_repo
        .find_by_id(&payload.booking_id)
        .await?
        .unwrap_or(booking);

    Ok(Json(BookingSyncResponse { booking, ghl_sync }))
}

pub async fn cron_sweep(
    State(state): State<Arc<AppState>>,
    _auth: CronAuth,
) -> Result<impl IntoResponse, AppError> {
    info!("Scheduled sync sweep triggered");
    let report = state.sync_service.run_sweep().await?;
    Ok(Json(report))
}
