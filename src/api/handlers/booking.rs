use axum::{extract::{Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::CreateBookingRequest;
use crate::api::dtos::responses::{
    BlockedSlotView, BookedSlotView, BookingSyncResponse, DaySlotsResponse, GhlSyncStatus,
};
use crate::domain::models::availability::BlockedTimeSlot;
use crate::domain::models::booking::{Booking, NewBookingParams};
use crate::domain::services::slots::{covered_hour_marks, format_minutes, parse_time_to_minutes};
use crate::domain::services::sync::SyncTrigger;
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use chrono::NaiveDate;
use tracing::{info, warn};

pub async fn get_day_slots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let date_str = params.get("date").ok_or(AppError::Validation("date required".into()))?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))?;
    let artist_id = params.get("artistId").map(String::as_str);

    let bookings = state.booking_repo.list_active_by_date(date).await?;
    let blocked = state.blocked_slot_repo.list_by_date(date).await?;

    let booked_slots: Vec<BookedSlotView> = bookings
        .iter()
        .filter(|b| match (artist_id, b.artist_id.as_deref()) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        })
        .map(BookedSlotView::from)
        .collect();

    let blocked_slots: Vec<BlockedSlotView> = blocked
        .iter()
        .filter(|b| match (artist_id, b.artist_id.as_deref()) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        })
        .map(BlockedSlotView::from)
        .collect();

    Ok(Json(DaySlotsResponse {
        date: date.to_string(),
        booked_slots,
        blocked_slots,
    }))
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!(
        "create_booking: {} on {} at {}",
        payload.service_name, payload.date, payload.time
    );

    if payload.client_name.trim().is_empty() {
        return Err(AppError::Validation("clientName is required".into()));
    }
    if payload.client_email.trim().is_empty() || !payload.client_email.contains('@') {
        return Err(AppError::Validation("A valid clientEmail is required".into()));
    }
    if payload.service_name.trim().is_empty() {
        return Err(AppError::Validation("serviceName is required".into()));
    }

    let date = NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))?;

    let start_min = parse_time_to_minutes(&payload.time)
        .ok_or_else(|| AppError::Validation("Invalid time format (HH:MM)".into()))?;
    if start_min >= 1440 {
        return Err(AppError::Validation("time must be before midnight".into()));
    }

    let end_min = match &payload.end_time {
        Some(raw) => {
            let end = parse_time_to_minutes(raw)
                .ok_or_else(|| AppError::Validation("Invalid endTime format (HH:MM)".into()))?;
            if end <= start_min {
                return Err(AppError::Validation("endTime must be after time".into()));
            }
            end
        }
        None => {
            let hours = payload.duration.unwrap_or(state.config.default_appointment_hours);
            if !(1..=12).contains(&hours) {
                return Err(AppError::Validation("duration must be between 1 and 12 hours".into()));
            }
            start_min + hours as u32 * 60
        }
    };
    if end_min > 1440 {
        return Err(AppError::Validation("Booking may not run past midnight".into()));
    }

    let time = format_minutes(start_min);
    let end_time = format_minutes(end_min);

    let service_name = payload.service_name.trim().to_string();
    let service_id = payload
        .service_id
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| service_name.to_lowercase().replace(' ', "-"));

    let booking = Booking::new(NewBookingParams {
        client_name: payload.client_name.trim().to_string(),
        client_email: payload.client_email.trim().to_string(),
        client_phone: payload.client_phone.trim().to_string(),
        service_id,
        service_name,
        date,
        time,
        end_time,
        artist_id: payload.artist_id.filter(|v| !v.is_empty()),
        artist_name: payload.artist_name.filter(|v| !v.is_empty()),
        price: payload.price.unwrap_or(0.0),
        deposit_amount: payload.deposit_amount.unwrap_or(0.0),
        notes: payload.notes.filter(|v| !v.is_empty()),
    });

    let blocked: Vec<BlockedTimeSlot> = covered_hour_marks(start_min, end_min)
        .into_iter()
        .map(|mark| {
            BlockedTimeSlot::new(
                date,
                format_minutes(mark),
                booking.artist_id.clone(),
                booking.id.clone(),
                "booking".to_string(),
            )
        })
        .collect();

    let created = state.booking_repo.create(&booking, &blocked).await?;
    info!("create_booking: booking {} stored", created.id);

    // Mirror into GHL inline; any failure lands on the record, never on the
    // client response status.
    let ghl_sync = match state
        .sync_service
        .sync_booking(&created, SyncTrigger::Booking)
        .await
    {
        Ok(outcome) => GhlSyncStatus::from_outcome(&outcome, &created),
        Err(e) => {
            warn!("create_booking: inline sync bookkeeping failed: {}", e);
            GhlSyncStatus::not_attempted(&e.to_string())
        }
    };

    let booking = state
        .booking_repo
        .find_by_id(&created.id)
        .await?
        .unwrap_or(created);

    Ok((StatusCode::CREATED, Json(BookingSyncResponse { booking, ghl_sync })))
}
