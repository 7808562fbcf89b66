use axum::{extract::{Query, State}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{DayScheduleUpdate, ResetScheduleRequest, UpdateScheduleRequest};
use crate::domain::models::availability::{ArtistAvailability, DAY_NAMES};
use crate::domain::services::slots::parse_time_to_minutes;
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let artist_id = params
        .get("artistId")
        .ok_or(AppError::Validation("artistId required".into()))?;

    let schedule = state.availability_repo.list_for_artist(artist_id).await?;
    Ok(Json(schedule))
}

pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.artist_id.trim().is_empty() {
        return Err(AppError::Validation("artistId is required".into()));
    }
    for day in &payload.days {
        validate_day(day)?;
    }

    for day in &payload.days {
        let record = ArtistAvailability::new(
            payload.artist_id.clone(),
            day.day_of_week.clone(),
            day.is_enabled,
            day.time_ranges.clone(),
            day.services_offered.clone(),
        );
        state.availability_repo.upsert(&record).await?;
    }
    info!(
        "Schedule updated for artist {} ({} days)",
        payload.artist_id,
        payload.days.len()
    );

    let schedule = state.availability_repo.list_for_artist(&payload.artist_id).await?;
    Ok(Json(schedule))
}

/// Replaces the artist's entire weekly schedule in one transaction; a failed
/// reset leaves the previous schedule intact.
pub async fn reset_schedule(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.artist_id.trim().is_empty() {
        return Err(AppError::Validation("artistId is required".into()));
    }
    for day in &payload.days {
        validate_day(day)?;
    }

    let schedule: Vec<ArtistAvailability> = payload
        .days
        .iter()
        .map(|day| {
            ArtistAvailability::new(
                payload.artist_id.clone(),
                day.day_of_week.clone(),
                day.is_enabled,
                day.time_ranges.clone(),
                day.services_offered.clone(),
            )
        })
        .collect();

    state
        .availability_repo
        .reset_for_artist(&payload.artist_id, &schedule)
        .await?;
    info!("Schedule reset for artist {}", payload.artist_id);

    let schedule = state.availability_repo.list_for_artist(&payload.artist_id).await?;
    Ok(Json(schedule))
}

fn validate_day(day: &DayScheduleUpdate) -> Result<(), AppError> {
    if !DAY_NAMES.contains(&day.day_of_week.as_str()) {
        return Err(AppError::Validation(format!(
            "Invalid dayOfWeek '{}'",
            day.day_of_week
        )));
    }

    let mut active: Vec<(u32, u32)> = Vec::new();
    for range in day.time_ranges.iter().filter(|r| r.is_active) {
        let start = parse_time_to_minutes(&range.start_time).ok_or_else(|| {
            AppError::Validation(format!("Invalid startTime '{}'", range.start_time))
        })?;
        let end = parse_time_to_minutes(&range.end_time).ok_or_else(|| {
            AppError::Validation(format!("Invalid endTime '{}'", range.end_time))
        })?;
        if start >= end {
            return Err(AppError::Validation(format!(
                "startTime must be before endTime ({} >= {})",
                range.start_time, range.end_time
            )));
        }
        active.push((start, end));
    }

    active.sort();
    for pair in active.windows(2) {
        if pair[1].0 < pair[0].1 {
            return Err(AppError::Validation(format!(
                "Overlapping time ranges on {}",
                day.day_of_week
            )));
        }
    }

    Ok(())
}
