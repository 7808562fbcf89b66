use axum::{extract::{Query, State}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::responses::{AvailabilityResponse, MonthAvailabilityResponse, MonthDay};
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use chrono::{Duration, NaiveDate};

/// Bookings on a single day at or past this count close the day in the
/// month view.
const DAY_BOOKING_CAPACITY: usize = 2;

pub async fn get_ghl_availability(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let date_str = params.get("date").ok_or(AppError::Validation("date required".into()))?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))?;

    let duration = match params.get("duration") {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| AppError::Validation("Invalid duration".into()))?,
        None => state.config.default_appointment_hours,
    };
    if !(1..=12).contains(&duration) {
        return Err(AppError::Validation("duration must be between 1 and 12 hours".into()));
    }

    let artist_id = params.get("artistId").map(String::as_str);

    let result = state
        .availability_service
        .get_availability(date, duration, artist_id)
        .await?;

    Ok(Json(AvailabilityResponse {
        date: date.to_string(),
        has_availability: result.has_availability,
        time_slots: result.time_slots,
        source: result.source,
        debug: result.debug,
    }))
}

pub async fn get_month_availability(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let start_str = params.get("startDate").ok_or(AppError::Validation("startDate required".into()))?;
    let end_str = params.get("endDate").ok_or(AppError::Validation("endDate required".into()))?;

    let start = NaiveDate::parse_from_str(start_str, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid startDate".into()))?;
    let end = NaiveDate::parse_from_str(end_str, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid endDate".into()))?;

    if end < start {
        return Err(AppError::Validation("endDate must not be before startDate".into()));
    }
    if (end - start).num_days() > 62 {
        return Err(AppError::Validation("Date range may span at most 62 days".into()));
    }

    let bookings = state.booking_repo.list_between(start, end).await?;
    let today = state.availability_service.studio_now().date_naive();

    let mut days = Vec::new();
    let mut next_available = None;

    let mut current = start;
    while current <= end {
        let booking_count = bookings
            .iter()
            .filter(|b| b.date == current && b.is_active())
            .count();
        let is_available = booking_count < DAY_BOOKING_CAPACITY;

        if is_available && current >= today && next_available.is_none() {
            next_available = Some(current.to_string());
        }

        days.push(MonthDay {
            date: current.to_string(),
            booking_count,
            is_available,
        });
        current += Duration::days(1);
    }

    Ok(Json(MonthAvailabilityResponse { days, next_available }))
}
